mod labeled;
pub use labeled::LabeledOptions;
