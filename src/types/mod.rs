pub mod douyin;
pub mod envelope;
pub mod ids;
pub mod message;
pub mod pay;

pub use douyin::*;
pub use envelope::*;
pub use ids::*;
pub use message::*;
pub use pay::*;
