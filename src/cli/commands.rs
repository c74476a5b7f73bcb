// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Three subcommands:
//   init-config  write a model config file
//   describe     parameter counts per network
//   probe        one forward pass through every network
//
// clap's derive macros generate help text, error messages,
// and string → number conversion for every flag below.

use clap::{Args, Subcommand};

use crate::application::probe_use_case::ProbeRequest;
use crate::domain::dialogue::Dialogue;
use crate::domain::hparams::HredConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a model config as JSON
    InitConfig(InitConfigArgs),

    /// Build the model and print parameter counts per network
    Describe(DescribeArgs),

    /// Run every network once over a dialogue and report the outputs
    Probe(ProbeArgs),
}

/// Every HredConfig field as a flag, defaulting to HredConfig::default().
#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Where to write the config
    #[arg(long, default_value = "hred.json")]
    pub out: String,

    /// Input vocabulary size
    #[arg(long, default_value_t = 10_000)]
    pub vocab_size: usize,

    /// Output vocabulary size of both decoders
    #[arg(long, default_value_t = 10_000)]
    pub output_vocab_size: usize,

    #[arg(long, default_value_t = 256)]
    pub encoder_hidden: usize,

    #[arg(long, default_value_t = 256)]
    pub context_hidden: usize,

    #[arg(long, default_value_t = 256)]
    pub decoder_hidden: usize,

    /// Stacked GRU layers in every network
    #[arg(long, default_value_t = 1)]
    pub n_layers: usize,

    /// Dropout between stacked GRU layers
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Encoder outputs the attention decoder can attend over
    #[arg(long, default_value_t = 20)]
    pub max_length: usize,

    /// Embeddings and output projections start uniform in ±init_range
    #[arg(long, default_value_t = 0.1)]
    pub init_range: f64,
}

/// Boundary between Layer 1 and the domain: no clap types past here.
impl From<&InitConfigArgs> for HredConfig {
    fn from(a: &InitConfigArgs) -> Self {
        HredConfig {
            vocab_size:        a.vocab_size,
            output_vocab_size: a.output_vocab_size,
            encoder_hidden:    a.encoder_hidden,
            context_hidden:    a.context_hidden,
            decoder_hidden:    a.decoder_hidden,
            n_layers:          a.n_layers,
            dropout:           a.dropout,
            max_length:        a.max_length,
            init_range:        a.init_range,
        }
    }
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Model config JSON; defaults are used when omitted
    #[arg(long)]
    pub config: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Model config JSON; defaults are used when omitted
    #[arg(long)]
    pub config: Option<String>,

    /// Token indices, turns separated by '|', e.g. "3 5 7 | 2 4"
    #[arg(long)]
    pub dialogue: Option<Dialogue>,

    /// Turns to sample when --dialogue is not given (at least 1)
    #[arg(long, default_value_t = 3)]
    pub random_turns: usize,

    /// Token fed to both decoders
    #[arg(long, default_value_t = 0)]
    pub start_token: usize,

    /// Most likely tokens to show per decoder
    #[arg(long, default_value_t = 5)]
    pub top_k: usize,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

impl From<&ProbeArgs> for ProbeRequest {
    fn from(a: &ProbeArgs) -> Self {
        ProbeRequest {
            dialogue:     a.dialogue.clone(),
            random_turns: a.random_turns,
            start_token:  a.start_token,
            top_k:        a.top_k,
        }
    }
}
