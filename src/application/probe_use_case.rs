// ============================================================
// Layer 2 - ProbeUseCase
// ============================================================
// Drives every network once over a dialogue so their wiring
// can be checked end to end without any training:
//
//   Step 1: Pick the dialogue           (given, or sampled with rand)
//   Step 2: Build the model             (Layer 5 - ml)
//   Step 3: Encode each turn            (EncoderRnn, token by token)
//   Step 4: Fold turns into a context   (ContextRnn)
//   Step 5: One plain decoder step      (DecoderRnn from start_token)
//   Step 6: One attention decoder step  (AttnDecoderRnn over the last turn,
//                                        seeded with that turn's encoder state)
//   Step 7: Summarise into a ProbeReport
//
// Only one step of each decoder runs. Choosing the next token
// is deliberately left to whoever drives the model.

use anyhow::{ensure, Result};
use burn::prelude::*;
use rand::Rng;
use serde::Serialize;

use crate::domain::dialogue::{Dialogue, Utterance};
use crate::domain::hparams::HredConfig;
use crate::ml::backend::BackendKind;
use crate::ml::hierarchy::HierarchicalModel;
use crate::ml::recurrent::to_vec;

/// What to probe with.
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// Explicit dialogue; sampled at random when None
    pub dialogue:     Option<Dialogue>,
    /// Number of turns to sample when no dialogue is given
    pub random_turns: usize,
    /// First token fed to both decoders
    pub start_token:  usize,
    /// How many of the most likely tokens to report
    pub top_k:        usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub tokens:              Vec<usize>,
    /// L2 norm of the encoder output after the last token
    pub final_output_norm:   f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecoderStepReport {
    /// Sum of exp(log_probs), 1.0 up to rounding
    pub prob_mass: f32,
    /// (token, probability), most likely first
    pub top:       Vec<(usize, f32)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub backend:        BackendKind,
    pub dialogue:       String,
    pub turns:          Vec<TurnReport>,
    pub context_hidden: [usize; 3],
    pub decoder:        DecoderStepReport,
    pub attn_decoder:   DecoderStepReport,
    /// One weight per history slot (max_length of them)
    pub attn_weights:   Vec<f32>,
}

pub struct ProbeUseCase {
    config:  HredConfig,
    backend: BackendKind,
}

impl ProbeUseCase {
    pub fn new(config: HredConfig, backend: BackendKind) -> Self {
        Self { config, backend }
    }

    /// Run the probe on whichever backend was selected.
    pub fn execute(&self, request: &ProbeRequest) -> Result<ProbeReport> {
        crate::with_backend!(self.backend, |B, device| {
            self.execute_on::<B>(request, &device)
        })
    }

    pub fn execute_on<B: Backend>(
        &self,
        request: &ProbeRequest,
        device:  &B::Device,
    ) -> Result<ProbeReport> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Dialogue ──────────────────────────────────────────────────
        let dialogue = match &request.dialogue {
            Some(d) => d.clone(),
            None    => {
                ensure!(request.random_turns > 0, "random_turns must be at least 1");
                random_dialogue(cfg, request.random_turns)
            }
        };
        ensure!(!dialogue.turns.is_empty(), "dialogue has no turns");
        if let Some(max) = dialogue.max_token() {
            ensure!(
                max < cfg.vocab_size,
                "token {max} does not fit a vocabulary of {}", cfg.vocab_size
            );
        }
        ensure!(
            request.start_token < cfg.output_vocab_size,
            "start token {} does not fit an output vocabulary of {}",
            request.start_token, cfg.output_vocab_size
        );
        tracing::info!("Probing with {} turn(s): {}", dialogue.turns.len(), dialogue);

        // ── Step 2: Model ─────────────────────────────────────────────────────
        let model = HierarchicalModel::<B>::new(cfg, device);

        // ── Step 3: Encode turns ──────────────────────────────────────────────
        let encoded = dialogue
            .turns
            .iter()
            .map(|u| model.encode_utterance(&u.tokens))
            .collect::<Result<Vec<_>, _>>()?;

        let turns = dialogue
            .turns
            .iter()
            .zip(&encoded)
            .map(|(u, e)| -> Result<TurnReport> {
                let norm = to_vec(e.last_output())?
                    .iter()
                    .map(|v| v * v)
                    .sum::<f32>()
                    .sqrt();
                Ok(TurnReport { tokens: u.tokens.clone(), final_output_norm: norm })
            })
            .collect::<Result<Vec<_>>>()?;

        // ── Step 4: Context ───────────────────────────────────────────────────
        let (context_output, context_hidden) = model.fold_context(&encoded)?;

        // ── Step 5: Plain decoder ─────────────────────────────────────────────
        let (log_probs, _) = model.decoder.forward(
            context_output,
            request.start_token,
            model.decoder.init_hidden(),
        )?;
        let decoder = summarise(to_vec(log_probs)?, request.top_k);

        // ── Step 6: Attention decoder ─────────────────────────────────────────
        let last = encoded.last().ok_or_else(|| anyhow::anyhow!("no encoded turns"))?;
        let step = model.attn_decoder.forward(
            request.start_token,
            last.hidden.clone(),
            last.outputs.clone(),
        )?;
        let attn_decoder = summarise(to_vec(step.log_probs)?, request.top_k);
        let attn_weights = to_vec(step.attn_weights)?;

        tracing::debug!("Decoder mass {:.6}, attention decoder mass {:.6}",
            decoder.prob_mass, attn_decoder.prob_mass);

        // ── Step 7: Report ────────────────────────────────────────────────────
        Ok(ProbeReport {
            backend:        self.backend,
            dialogue:       dialogue.to_string(),
            turns,
            context_hidden: context_hidden.dims(),
            decoder,
            attn_decoder,
            attn_weights,
        })
    }
}

/// Sample `turns` utterances, each 1..=max_length tokens long.
fn random_dialogue(cfg: &HredConfig, turns: usize) -> Dialogue {
    let mut rng = rand::thread_rng();
    let turns = (0..turns)
        .map(|_| {
            let len = rng.gen_range(1..=cfg.max_length);
            Utterance::new((0..len).map(|_| rng.gen_range(0..cfg.vocab_size)).collect())
        })
        .collect();
    Dialogue::new(turns)
}

/// Probability mass and the `k` most likely tokens of a log-prob vector.
fn summarise(log_probs: Vec<f32>, k: usize) -> DecoderStepReport {
    let probs: Vec<f32> = log_probs.iter().map(|lp| lp.exp()).collect();
    let prob_mass = probs.iter().sum();

    let mut ranked: Vec<(usize, f32)> = probs.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(k);

    DecoderStepReport { prob_mass, top: ranked }
}
