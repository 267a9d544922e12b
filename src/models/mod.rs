pub mod diabetes;
pub mod enums;
pub mod form;
pub mod heart_disease;
pub mod parkinsons;
pub mod patient;

pub use diabetes::*;
pub use enums::*;
pub use form::*;
pub use heart_disease::*;
pub use parkinsons::*;
pub use patient::*;
