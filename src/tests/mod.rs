mod support;

mod chain_tests;
mod lexicon_tests;
mod mapping_tests;
