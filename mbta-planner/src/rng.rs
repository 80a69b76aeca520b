//! Seeded, domain-separated random streams for the planner generators.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;
use std::cell::{RefCell, RefMut};

/// Independent RNG streams so that refreshing one signal never perturbs another.
#[derive(Debug)]
pub struct RngBundle {
    seed: u64,
    congestion: RefCell<CountingRng<SmallRng>>,
    trains: RefCell<CountingRng<SmallRng>>,
    itinerary: RefCell<CountingRng<SmallRng>>,
    arrivals: RefCell<CountingRng<SmallRng>>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            congestion: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"congestion"))),
            trains: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"trains"))),
            itinerary: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"itinerary"))),
            arrivals: RefCell::new(CountingRng::new(derive_stream_seed(seed, b"arrivals"))),
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Access the congestion (and scenario fold) RNG stream.
    #[must_use]
    pub fn congestion(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.congestion.borrow_mut()
    }

    /// Access the train position RNG stream.
    #[must_use]
    pub fn trains(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.trains.borrow_mut()
    }

    /// Access the itinerary (option duration) RNG stream.
    #[must_use]
    pub fn itinerary(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.itinerary.borrow_mut()
    }

    /// Access the station arrivals RNG stream.
    #[must_use]
    pub fn arrivals(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.arrivals.borrow_mut()
    }
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
