pub mod annotator;
