pub mod mnb;
pub mod reversible;
pub mod util;

pub use mnb::MnbService;
pub use reversible::ReversibleService;
