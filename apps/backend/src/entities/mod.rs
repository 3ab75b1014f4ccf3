pub mod counter;

pub use counter::Entity as Counter;
pub use counter::Model as CounterRow;
