/// Subdomain enumeration flow: initial query, output, recursive expansion
use anyhow::Result;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::io::Write;
use std::time::Duration;

use crate::collector::{IngestStats, SubdomainCollector};
use crate::config::Config;
use crate::crt_sh::{wildcard_query, CrtShClient};
use crate::error::FetchError;
use crate::utils;

/// Owns the search client and the name sets for one run.
pub struct Enumerator {
    client: CrtShClient,
    collector: SubdomainCollector,
    verbose: bool,
}

impl Enumerator {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: CrtShClient::new(config)?,
            collector: SubdomainCollector::new(),
            verbose: config.verbose,
        })
    }

    pub fn collector(&self) -> &SubdomainCollector {
        &self.collector
    }

    pub fn into_collector(self) -> SubdomainCollector {
        self.collector
    }

    /// Runs one search and merges the result into the collector.
    ///
    /// Every failure is reported on stderr and turns into `None`; the sets
    /// are left untouched in that case.
    pub async fn query(&mut self, query: &str) -> Option<IngestStats> {
        let body = match self.client.fetch(query).await {
            Ok(body) => body,
            Err(e) => {
                report_failure(query, &e, self.verbose);
                return None;
            }
        };

        match self.collector.ingest_json(query, &body) {
            Ok(stats) => {
                if stats.skipped > 0 {
                    eprintln!(
                        "{} Skipped {} record(s) for {}: name_value field missing or not a string",
                        "✗".red(),
                        stats.skipped,
                        query
                    );
                }
                if self.verbose {
                    eprintln!(
                        "[VERBOSE] {}: {} records, {} new subdomains, {} new wildcards",
                        query, stats.records, stats.new_subdomains, stats.new_wildcards
                    );
                }
                Some(stats)
            }
            Err(e) => {
                report_failure(query, &e, self.verbose);
                None
            }
        }
    }

    /// Re-queries every wildcard name known right now, one level deep.
    ///
    /// The wildcard set is snapshotted first, so wildcards discovered by these
    /// follow-up queries are not expanded themselves. Returns the number of
    /// queries issued.
    pub async fn expand_wildcards(&mut self) -> Result<usize> {
        let snapshot: Vec<String> = self
            .collector
            .wildcards()
            .into_iter()
            .map(str::to_string)
            .collect();

        if snapshot.is_empty() {
            if self.verbose {
                eprintln!("[VERBOSE] No wildcard names to expand");
            }
            return Ok(0);
        }

        let pb = ProgressBar::new(snapshot.len() as u64);
        pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{pos}/{len}] {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));

        for name in &snapshot {
            pb.set_message(format!("Expanding {}...", name));
            self.query(&wildcard_query(name)).await;
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(snapshot.len())
    }
}

fn report_failure(query: &str, error: &FetchError, verbose: bool) {
    match error {
        FetchError::EmptyBody { .. } => eprintln!("{} {}", "!".yellow(), error),
        FetchError::Decode { body, .. } => {
            eprintln!("{} {} (query: {})", "✗".red(), error, query);
            if verbose {
                eprintln!("[VERBOSE] Raw response body:\n{}", body);
            }
        }
        _ => eprintln!("{} {} (query: {})", "✗".red(), error, query),
    }
}

/// Runs a full enumeration for `config.domain`, writing names to `out`.
///
/// Plain names from the initial query are written first. With recursion on,
/// plain names first seen during expansion follow, then wildcard names when
/// requested. When the initial query yields nothing a single "no results"
/// line is written and the run stops there.
pub async fn run<W: Write>(config: &Config, out: &mut W) -> Result<SubdomainCollector> {
    let mut enumerator = Enumerator::new(config)?;

    if config.verbose {
        eprintln!(
            "[VERBOSE] Querying certificate transparency logs for {}",
            config.domain
        );
    }
    enumerator.query(&config.domain).await;

    if enumerator.collector().is_empty() {
        writeln!(out, "No subdomains found for domain: {}", config.domain)?;
        return Ok(enumerator.into_collector());
    }

    let printed: Vec<String> = enumerator
        .collector()
        .subdomains()
        .into_iter()
        .map(str::to_string)
        .collect();
    for name in &printed {
        writeln!(out, "{}", name)?;
    }

    if config.recursive {
        let queries = enumerator.expand_wildcards().await?;
        let already: HashSet<&str> = printed.iter().map(String::as_str).collect();
        let fresh: Vec<&str> = enumerator
            .collector()
            .subdomains()
            .into_iter()
            .filter(|name| !already.contains(name))
            .collect();
        for name in &fresh {
            writeln!(out, "{}", name)?;
        }
        eprintln!(
            "{} Recursive search issued {} queries, {} new subdomain(s)",
            "✓".green(),
            queries,
            fresh.len()
        );
    }

    let collector = enumerator.into_collector();

    if config.include_wildcards {
        for name in collector.wildcards() {
            writeln!(out, "{}", name)?;
        }
    }
    out.flush()?;

    if let Some(path) = &config.output_file {
        let mut names = collector.subdomains();
        if config.include_wildcards {
            names.extend(collector.wildcards());
        }
        let written = utils::write_lines(path, names)?;
        eprintln!("{} Saved {} names to: {}", "✓".green(), written, path.display());
    }

    Ok(collector)
}
