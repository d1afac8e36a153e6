use ndarray::Array2;

use super::*;

/// Generation strategy that deals pair values over a uniformly shuffled cell
/// order. The shuffle is the rand crate's Fisher-Yates (`shuffle`), so every
/// permutation of the deal order is equally likely; given the same seed the
/// same board is reproduced draw for draw.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: GameConfig) -> PairLayout {
        use rand::prelude::*;

        let size = config.size() as usize;

        let mut order: Vec<CellCount> = (0..config.total_cells()).collect();
        let mut rng = SmallRng::seed_from_u64(self.seed);
        order.shuffle(&mut rng);

        // Deal the shuffled cell indexes two at a time; each pair of cells
        // receives the next pair value in ascending order. `PairValue::MAX`
        // marks cells not dealt yet and is outside the valid value range, so
        // a partial deal cannot pass `from_values`.
        let mut values: Array2<PairValue> = Array2::from_elem((size, size), PairValue::MAX);
        for (pair, cells) in order.chunks_exact(2).enumerate() {
            for &cell in cells {
                let cell = cell as usize;
                values[(cell / size, cell % size)] = pair as PairValue;
            }
        }

        log::debug!(
            "Generated {} pairs over a {}x{} board with seed {}",
            config.pair_count(),
            size,
            size,
            self.seed
        );

        PairLayout::from_values(values).expect("full deal should pair every cell")
    }
}
