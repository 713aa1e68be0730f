pub mod checklist;

pub use checklist::run;
