pub mod explore;
pub mod inspect;
