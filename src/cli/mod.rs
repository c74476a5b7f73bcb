// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, hands the work to Layer 2, and
// prints whatever comes back. Nothing here touches tensors.
//
// The backend flag is global:
//   hred --backend wgpu probe --dialogue "3 5 7 | 2 4"

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, DescribeArgs, InitConfigArgs, ProbeArgs};

use crate::application::{
    describe_use_case::DescribeUseCase,
    probe_use_case::{ProbeReport, ProbeUseCase},
    resolve_config,
};
use crate::domain::hparams::HredConfig;
use crate::domain::traits::ConfigSource;
use crate::infra::config_store::JsonConfigStore;
use crate::ml::backend::BackendKind;

#[derive(Parser, Debug)]
#[command(
    name = "hred",
    version,
    about = "Inspect hierarchical encoder / context / decoder recurrent networks."
)]
pub struct Cli {
    /// Compute backend every network is placed on
    #[arg(long, global = true, value_enum, default_value_t = BackendKind::Cpu)]
    pub backend: BackendKind,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match &self.command {
            Commands::InitConfig(args) => self.run_init_config(args),
            Commands::Describe(args)   => self.run_describe(args),
            Commands::Probe(args)      => self.run_probe(args),
        }
    }

    fn run_init_config(&self, args: &InitConfigArgs) -> Result<()> {
        let store = JsonConfigStore::new(&args.out);
        store.save(&HredConfig::from(args))?;
        println!("Config written to {}", store.path().display());
        Ok(())
    }

    fn run_describe(&self, args: &DescribeArgs) -> Result<()> {
        let config = load_config(args.config.as_deref())?;
        let desc   = DescribeUseCase::new(config, self.backend).execute()?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&desc)?);
            return Ok(());
        }

        let p = desc.params;
        println!("{:<14} {:>12}", "network", "parameters");
        println!("{:<14} {:>12}", "encoder", p.encoder);
        println!("{:<14} {:>12}", "context", p.context);
        println!("{:<14} {:>12}", "decoder", p.decoder);
        println!("{:<14} {:>12}", "attn_decoder", p.attn_decoder);
        println!("{:<14} {:>12}", "total", p.total());
        Ok(())
    }

    fn run_probe(&self, args: &ProbeArgs) -> Result<()> {
        let config = load_config(args.config.as_deref())?;
        let report = ProbeUseCase::new(config, self.backend).execute(&args.into())?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

fn load_config(path: Option<&str>) -> Result<HredConfig> {
    let store = path.map(JsonConfigStore::new);
    resolve_config(store.as_ref().map(|s| s as &dyn ConfigSource))
}

fn print_report(r: &ProbeReport) {
    println!("Backend:  {:?}", r.backend);
    println!("Dialogue: {}", r.dialogue);
    for (i, turn) in r.turns.iter().enumerate() {
        println!("  turn {:>2}: {} token(s), |h| = {:.4}",
            i + 1, turn.tokens.len(), turn.final_output_norm);
    }
    println!("Context hidden: {:?}", r.context_hidden);

    for (name, step) in [("Decoder", &r.decoder), ("Attention decoder", &r.attn_decoder)] {
        println!("\n{name} (mass {:.6}):", step.prob_mass);
        for (token, p) in &step.top {
            println!("  {token:>6}  {p:.5}");
        }
    }

    let weights: Vec<String> = r.attn_weights.iter().map(|w| format!("{w:.3}")).collect();
    println!("\nAttention weights: [{}]", weights.join(", "));
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_defaults_match_domain() {
        let cli = Cli::try_parse_from(["hred", "init-config"]).unwrap();
        match &cli.command {
            Commands::InitConfig(args) => {
                assert_eq!(args.out, "hred.json");
                assert_eq!(HredConfig::from(args), HredConfig::default());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_probe_parses_dialogue_and_global_backend() {
        let cli = Cli::try_parse_from([
            "hred", "probe", "--dialogue", "3 5 7 | 2 4", "--top-k", "2", "--backend", "wgpu",
        ])
        .unwrap();
        assert_eq!(cli.backend, BackendKind::Wgpu);
        match &cli.command {
            Commands::Probe(args) => {
                let dialogue = args.dialogue.as_ref().unwrap();
                assert_eq!(dialogue.turns.len(), 2);
                assert_eq!(dialogue.turns[0].tokens, vec![3, 5, 7]);
                assert_eq!(args.top_k, 2);
                assert!(!args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_probe_rejects_bad_dialogue() {
        let res = Cli::try_parse_from(["hred", "probe", "--dialogue", "1 x"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_describe_defaults_to_cpu() {
        let cli = Cli::try_parse_from(["hred", "describe", "--json"]).unwrap();
        assert_eq!(cli.backend, BackendKind::Cpu);
        assert!(matches!(cli.command, Commands::Describe(DescribeArgs { json: true, .. })));
    }

    #[test]
    fn test_init_config_writes_file() {
        let dir  = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cfg.json");
        let path_str = path.to_str().unwrap();

        Cli::try_parse_from(["hred", "init-config", "--out", path_str, "--max-length", "9"])
            .unwrap()
            .run()
            .unwrap();

        let cfg = JsonConfigStore::new(&path).load().unwrap();
        assert_eq!(cfg.max_length, 9);
    }
}
