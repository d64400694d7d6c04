use std::{io::Write, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    ledger::Ledger,
    tracker::{
        alerts::{Alert, Severity},
        ActivityTracker,
    },
    utils::{clock::Clock, time::format_elapsed},
};

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Terminal stand-in for the desktop shell: it owns nothing but references
/// to the core pieces, turns input lines into core calls and renders the
/// results. Runs until `quit`, end of input or Ctrl-C.
pub struct SessionShell {
    tracker: ActivityTracker,
    ledger: Ledger,
    clock: Arc<dyn Clock>,
    default_order: String,
    /// Where the next residual slice starts: session start, moved forward on
    /// every push and reset. Time before this point is already attributed.
    attribution_point: DateTime<Utc>,
}

impl SessionShell {
    pub fn new(config: &AppConfig, ledger: Ledger, clock: Arc<dyn Clock>) -> Self {
        Self {
            tracker: ActivityTracker::new(clock.clone(), &config.notifications),
            ledger,
            default_order: config.mind.defaultorder.clone(),
            attribution_point: clock.time(),
            clock,
        }
    }

    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        self.greet().await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if self.handle_line(line.trim()).await? == Flow::Quit {
                                break;
                            }
                        }
                        // Input closed, same as quitting.
                        None => break,
                    }
                }
                _ = self.clock.sleep_until(self.clock.instant() + TICK), if self.tracker.is_running() => {
                    self.render_tick();
                }
            }
        }

        self.finalize().await
    }

    async fn greet(&self) -> Result<()> {
        println!("worktally session. Commands: start, pause, toggle, reset, order <name>, push, orders, status, quit");
        let known = self.ledger.known_activity_names().await?;
        if !known.is_empty() {
            println!(
                "Known orders: {}",
                known.into_iter().collect::<Vec<_>>().join(", ")
            );
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let (command, argument) = match line.split_once(' ') {
            Some((command, argument)) => (command, argument.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "start" => self.tracker.start(),
            "pause" => {
                self.tracker.pause();
                self.flush_elapsed().await?;
            }
            "toggle" | "t" => {
                self.tracker.toggle();
                if !self.tracker.is_running() {
                    self.flush_elapsed().await?;
                }
            }
            "reset" => {
                // Flush first so the aborted session still counts for today.
                self.flush_elapsed().await?;
                self.tracker.reset();
                self.attribution_point = self.clock.time();
                println!("{}", format_elapsed(self.tracker.elapsed()));
            }
            "order" if argument.is_empty() => {
                println!("Usage: order <name>");
            }
            "order" => {
                // A pending slice belongs to the previous order, settle it
                // before switching.
                self.push_selection().await?;
                self.tracker.select_order(argument);
                println!("Working on {argument}");
            }
            "push" => {
                if self.tracker.selected_order().is_some() {
                    self.push_selection().await?;
                } else {
                    self.push_residual().await?;
                }
            }
            "orders" => {
                for name in self.ledger.known_activity_names().await? {
                    println!("{name}");
                }
            }
            "status" => {
                println!(
                    "{} ({}){}",
                    format_elapsed(self.tracker.elapsed()),
                    if self.tracker.is_running() {
                        "running"
                    } else {
                        "paused"
                    },
                    self.tracker
                        .selected_order()
                        .map(|name| format!(", on {name}"))
                        .unwrap_or_default()
                );
            }
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            other => println!("Unknown command {other:?}, try: start, pause, toggle, reset, order <name>, push, orders, status, quit"),
        }
        Ok(Flow::Continue)
    }

    fn render_tick(&mut self) {
        print!("\r{} ", format_elapsed(self.tracker.elapsed()));
        let _ = std::io::stdout().flush();
        if let Some(alert) = self.tracker.check_alert() {
            show_alert(alert);
        }
    }

    async fn flush_elapsed(&mut self) -> Result<()> {
        let elapsed = self.tracker.elapsed();
        debug!("Flushing elapsed {elapsed} to the ledger");
        self.ledger.upsert_elapsed(elapsed).await
    }

    /// Settles the pending order slice, if any.
    async fn push_selection(&mut self) -> Result<()> {
        let Some((name, spent)) = self.tracker.take_order() else {
            return Ok(());
        };
        info!("Pushing {spent} onto order {name}");
        self.ledger.accumulate_activity(&name, spent).await?;
        self.attribution_point = self.clock.time();
        println!("Pushed {} to {name}", format_elapsed(spent));
        Ok(())
    }

    /// A push with nothing selected names the unattributed time since the
    /// last push after the configured default order.
    async fn push_residual(&mut self) -> Result<()> {
        let now = self.clock.time();
        let residual = now - self.attribution_point;
        let name = self.default_order.clone();
        info!("Pushing residual {residual} onto default order {name}");
        self.ledger.accumulate_activity(&name, residual).await?;
        self.attribution_point = now;
        println!("Pushed {} to {name}", format_elapsed(residual));
        Ok(())
    }

    /// Pause, settle any pending order and flush before the process exits.
    async fn finalize(&mut self) -> Result<()> {
        self.tracker.pause();
        self.push_selection().await?;
        self.flush_elapsed().await?;
        println!("\nTracked {} today", format_elapsed(self.tracker.elapsed()));
        Ok(())
    }
}

fn show_alert(alert: Alert) {
    let tag = match alert.severity {
        Severity::Information => "INFO",
        Severity::Warning => "WARNING",
        Severity::Critical => "CRITICAL",
    };
    println!("\n[{tag}] {}", alert.message);
}

/// Turns Ctrl-C into session shutdown so in-flight time still gets flushed.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        cancelation.cancel();
    }
}
