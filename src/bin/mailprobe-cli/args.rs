use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mailprobe_lib::VerifyOptions;

#[derive(Parser)]
#[command(name = "mailprobe-cli", version)]
#[command(about = "Sonde SMTP (sans envoi) : existence d'adresse, catch-all, devinette de format")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// enveloppe MAIL FROM utilisée pour les sondes
    #[arg(long = "from", env = "MAILPROBE_FROM", global = true)]
    pub from: Option<String>,

    /// nom utilisé pour EHLO (par défaut le domaine de --from)
    #[arg(long, global = true)]
    pub helo: Option<String>,

    /// timeout par connexion (ms)
    #[arg(long = "timeout", default_value_t = 15_000, global = true)]
    pub timeout_ms: u64,

    /// premier port essayé sur chaque MX (587 puis 465 ensuite)
    #[arg(long, default_value_t = 25, global = true)]
    pub port: u16,

    /// nombre de MX supplémentaires essayés
    #[arg(long, default_value_t = 2, global = true)]
    pub retries: u32,

    /// simulation: aucune connexion, chaque session répond true|false
    #[arg(long, value_name = "true|false", global = true)]
    pub simulate: Option<bool>,

    /// format: human|json
    #[arg(long, default_value = "human", global = true)]
    pub format: String,

    /// logs de debug sur stderr (RUST_LOG prend le pas)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// vérifie qu'une adresse est acceptée par son MX
    Verify { email: String },
    /// détecte si le domaine accepte n'importe quel destinataire
    CatchAll { domain: String },
    /// devine l'adresse d'une personne sur un domaine
    Guess {
        first_name: String,
        last_name: String,
        domain: String,
    },
    /// infère le format d'adresse du domaine avec des noms fictifs
    DetectPattern { domain: String },
    /// affiche la route MX résolue
    Mx { domain: String },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn verify_options(&self) -> Result<VerifyOptions> {
        let from = self
            .from
            .clone()
            .context("--from (ou MAILPROBE_FROM) est requis pour sonder un serveur")?;
        let mut options = VerifyOptions::new(from);
        options.helo_name = self.helo.clone();
        options.timeout = Duration::from_millis(self.timeout_ms);
        options.port = self.port;
        options.retry_count = self.retries;
        if let Some(result) = self.simulate {
            options = options.simulated(result);
        }
        Ok(options)
    }
}
