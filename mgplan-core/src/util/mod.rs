pub mod halton;
