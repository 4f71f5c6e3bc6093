// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CLI commands. The only place in Scanwerk that touches the filesystem.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use scanwerk_core::config::{CaptureConfig, EnhancementOptions};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::human_errors::missing_field_prompt;
use scanwerk_document::DocumentEnhancer;
use scanwerk_extract::extract_fields;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "scanwerk")]
#[command(about = "Enhance document photos and extract fields from OCR text")]
#[command(version)]
pub struct Cli {
    /// JSON config file (enhancement options and pipeline limits)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clean up and resize a document photo
    Enhance {
        /// Encoded image to read
        input: PathBuf,
        /// Where to write the enhanced JPEG
        output: PathBuf,
        /// Bounding box width in pixels
        #[arg(long)]
        max_width: Option<u32>,
        /// Bounding box height in pixels
        #[arg(long)]
        max_height: Option<u32>,
        /// Encode quality in (0, 1]
        #[arg(long)]
        quality: Option<f32>,
        /// Skip the contrast/brightness pass
        #[arg(long)]
        no_align: bool,
        /// Plain resize without sharpening
        #[arg(long)]
        no_enhance: bool,
        /// Fail on encode errors instead of writing the original bytes
        #[arg(long)]
        strict: bool,
    },

    /// Extract structured fields from OCR text and print them as JSON
    Extract {
        /// Text file to read, or `-` for stdin
        input: PathBuf,
        /// Document type: passport, driver_license, national_id, visa, ssn
        #[arg(long)]
        hint: Option<String>,
        /// List fields that need manual entry on stderr
        #[arg(long)]
        prompts: bool,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => CaptureConfig::load(path)?,
        None => CaptureConfig::default(),
    };

    match cli.command {
        Commands::Enhance {
            input,
            output,
            max_width,
            max_height,
            quality,
            no_align,
            no_enhance,
            strict,
        } => {
            let options = EnhancementOptions {
                max_width: max_width.unwrap_or(config.enhancement.max_width),
                max_height: max_height.unwrap_or(config.enhancement.max_height),
                quality: quality.unwrap_or(config.enhancement.quality),
                auto_align: config.enhancement.auto_align && !no_align,
                enhance_quality: config.enhancement.enhance_quality && !no_enhance,
            };
            let enhancer = DocumentEnhancer::with_limits(options, config.limits);
            enhance_file(&enhancer, &input, &output, strict)
        }
        Commands::Extract {
            input,
            hint,
            prompts,
        } => extract_file(&input, hint.as_deref(), prompts),
    }
}

fn enhance_file(enhancer: &DocumentEnhancer, input: &Path, output: &Path, strict: bool) -> Result<()> {
    let raw = std::fs::read(input)?;
    let bytes = if strict {
        enhancer.enhance_checked(&raw)?
    } else {
        let (bytes, report) = enhancer.enhance_with_report(&raw);
        if report.returned_original {
            warn!(input = %input.display(), "Enhancement not possible; writing original bytes");
        }
        bytes
    };
    std::fs::write(output, &bytes)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        in_len = raw.len(),
        out_len = bytes.len(),
        "Wrote enhanced image"
    );
    Ok(())
}

fn read_text(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}

fn extract_file(input: &Path, hint: Option<&str>, prompts: bool) -> Result<()> {
    let text = read_text(input)?;
    let fields = extract_fields(&text, hint);

    let json = serde_json::to_string_pretty(&fields).map_err(ScanwerkError::from)?;
    println!("{json}");

    if prompts {
        for slot in fields.missing_slots() {
            eprintln!("{}", missing_field_prompt(slot).suggestion);
        }
    }
    Ok(())
}
