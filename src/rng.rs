#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
    initial_seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            initial_seed: seed,
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u32>())
    }

    pub fn seed_used(&self) -> u32 {
        self.initial_seed
    }

    fn next_u32(&mut self) -> u32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    pub fn value(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    pub fn floor_range(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (high as i64 - low as i64) as f64;
        let offset = (self.value() * span).floor() as i64;
        (low as i64 + offset).min(high as i64 - 1) as i32
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.value() < probability
    }

    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let idx = (self.value() * len as f64).floor() as usize;
        Some(idx.min(len - 1))
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let idx = self.pick_index(items.len())?;
        items.get(idx)
    }

    pub fn shuffle<T>(&mut self, mut items: Vec<T>) -> Vec<T> {
        for i in (1..items.len()).rev() {
            let j = self.floor_range(0, i as i32 + 1) as usize;
            items.swap(i, j);
        }
        items
    }
}
