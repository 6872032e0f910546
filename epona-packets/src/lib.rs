mod types;
pub use self::types::*;

mod checksum;
pub use self::checksum::*;

mod epona;
pub use self::epona::*;

mod mare;
pub use self::mare::*;
