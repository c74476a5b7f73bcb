//! Hierarchical recurrent encoder-decoder networks for dialogue modelling.
//!
//! Four Burn modules: [`ml::encoder::EncoderRnn`], [`ml::context::ContextRnn`],
//! [`ml::decoder::DecoderRnn`] and [`ml::attn_decoder::AttnDecoderRnn`], plus
//! [`ml::hierarchy::HierarchicalModel`] which builds all four from a single
//! [`domain::hparams::HredConfig`].

#![recursion_limit = "256"]

pub mod cli;
pub mod application;
pub mod domain;
pub mod ml;
pub mod infra;
