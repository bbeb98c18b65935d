//! Output formats for the runner.
//!
//! Text output is for people. JSON output is one object per line:
//!
//! ```text
//! {"type":"start","seed":7,"survivors":5,"crash_site":{"x":5,"y":5}}
//! {"type":"day","summary":{...},"resources":{"Food":45,...},"survivors":5}
//! {"type":"finished","outcome":"Lost","days_played":23}
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, Write};

use exodus_core::prelude::*;
use serde::Serialize;

/// A line of JSON output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report<'a> {
    /// The session was created.
    Start {
        /// Session seed.
        seed: u64,
        /// Starting roster size.
        survivors: usize,
        /// Where the ship came down.
        crash_site: Location,
    },
    /// A day was played.
    Day {
        /// Everything that happened.
        summary: &'a DaySummary,
        /// Ledger after the day.
        resources: BTreeMap<ResourceKind, u32>,
        /// Survivors after the day.
        survivors: usize,
    },
    /// The run stopped.
    Finished {
        /// Final state.
        outcome: GameOutcome,
        /// Days played.
        days_played: u32,
    },
}

/// Output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON lines.
    Json,
}

/// Writes run progress to a sink.
pub struct Presenter<W: Write> {
    out: W,
    format: Format,
}

impl<W: Write> Presenter<W> {
    /// Create a presenter.
    pub fn new(out: W, format: Format) -> Self {
        Self { out, format }
    }

    /// Consume the presenter and return the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Announce a new session.
    pub fn start(&mut self, session: &Session) -> io::Result<()> {
        match self.format {
            Format::Json => self.json(&Report::Start {
                seed: session.seed(),
                survivors: session.colony().population(),
                crash_site: session.world().crash_site(),
            }),
            Format::Text => {
                writeln!(
                    self.out,
                    "The colony ship has crash-landed at {} (seed {}).",
                    session.world().crash_site(),
                    session.seed()
                )?;
                for survivor in session.colony().survivors() {
                    writeln!(
                        self.out,
                        "  {} {} ({:?}) health {} morale {}",
                        survivor.id(),
                        survivor.name(),
                        survivor.skill,
                        survivor.health(),
                        survivor.morale()
                    )?;
                }
                Ok(())
            }
        }
    }

    /// Report a played day.
    pub fn day(&mut self, summary: &DaySummary, session: &Session) -> io::Result<()> {
        match self.format {
            Format::Json => self.json(&Report::Day {
                summary,
                resources: summary.resources.iter().collect(),
                survivors: summary.population,
            }),
            Format::Text => {
                let text = render_day(summary, session.colony());
                self.out.write_all(text.as_bytes())
            }
        }
    }

    /// Report the end of a run under the given victory rule.
    pub fn finished(
        &mut self,
        outcome: GameOutcome,
        days_played: u32,
        victory: VictoryRule,
    ) -> io::Result<()> {
        match self.format {
            Format::Json => self.json(&Report::Finished {
                outcome,
                days_played,
            }),
            Format::Text => {
                let line = match outcome {
                    GameOutcome::Won => match victory {
                        VictoryRule::SelfSufficient { .. } => format!(
                            "The colony is self-sufficient after {days_played} days. Victory!"
                        ),
                        VictoryRule::SurviveDays(_) => format!(
                            "The colony has survived {days_played} days. Victory!"
                        ),
                    },
                    GameOutcome::Lost => {
                        format!("All survivors have perished after {days_played} days.")
                    }
                    GameOutcome::Ongoing => {
                        format!("Stopped after {days_played} days; the colony endures.")
                    }
                };
                writeln!(self.out, "{line}")
            }
        }
    }

    fn json(&mut self, report: &Report<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, report).map_err(io::Error::other)?;
        writeln!(self.out)
    }
}

/// Render one day as text.
#[must_use]
pub fn render_day(summary: &DaySummary, colony: &Colony) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "=== Day {} ===", summary.day);
    for line in &summary.log {
        let _ = writeln!(text, "  {line}");
    }
    let resources: Vec<String> = ResourceKind::ALL
        .iter()
        .map(|&kind| format!("{kind} {}", summary.resources.get(kind)))
        .collect();
    let _ = writeln!(text, "  Resources: {}", resources.join(" | "));
    let _ = writeln!(text, "  Survivors: {}", summary.population);
    if let Some(project) = colony.in_progress_building() {
        let _ = writeln!(
            text,
            "  Building: {} {}/{} ({}%)",
            project.building_type(),
            project.progress(),
            project.required_progress(),
            project.percentage()
        );
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use exodus_test_utils::fixtures::{default_session, ColonyBuilder};

    #[test]
    fn test_json_lines_are_tagged() {
        let mut session = default_session(4);
        let summary = session.advance_day().unwrap();

        let mut presenter = Presenter::new(Vec::new(), Format::Json);
        presenter.start(&session).unwrap();
        presenter.day(&summary, &session).unwrap();
        presenter
            .finished(GameOutcome::Ongoing, 1, VictoryRule::default())
            .unwrap();
        let output = String::from_utf8(presenter.into_inner()).unwrap();

        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "start");
        assert_eq!(lines[1]["type"], "day");
        assert_eq!(lines[1]["summary"]["day"], 1);
        assert!(lines[1]["resources"]["Food"].is_u64());
        assert_eq!(lines[2]["type"], "finished");
        assert_eq!(lines[2]["outcome"], "Ongoing");
    }

    #[test]
    fn test_text_day_lists_log_and_resources() {
        let mut session = default_session(4);
        let summary = session.advance_day().unwrap();
        let text = render_day(&summary, session.colony());
        assert!(text.starts_with("=== Day 1 ==="));
        assert!(text.contains("Colony consumed 5 Food and 5 Water."));
        assert!(text.contains("Resources: Food "));
        assert!(text.contains("Survivors: 5"));
    }

    #[test]
    fn test_text_day_shows_construction_percentage() {
        let colony = ColonyBuilder::new()
            .in_progress(BuildingType::Shelter, 18)
            .build();
        let summary = DaySummary {
            day: 3,
            ..DaySummary::default()
        };
        let text = render_day(&summary, &colony);
        assert!(text.contains("Building: Shelter 18/20 (90%)"));
    }

    #[test]
    fn test_text_finished_lines() {
        let mut presenter = Presenter::new(Vec::new(), Format::Text);
        presenter
            .finished(GameOutcome::Lost, 12, VictoryRule::default())
            .unwrap();
        let output = String::from_utf8(presenter.into_inner()).unwrap();
        assert_eq!(output, "All survivors have perished after 12 days.\n");
    }

    #[test]
    fn test_victory_line_follows_rule() {
        let line = |victory| {
            let mut presenter = Presenter::new(Vec::new(), Format::Text);
            presenter.finished(GameOutcome::Won, 60, victory).unwrap();
            String::from_utf8(presenter.into_inner()).unwrap()
        };
        assert_eq!(
            line(VictoryRule::SurviveDays(60)),
            "The colony has survived 60 days. Victory!\n"
        );
        assert_eq!(
            line(VictoryRule::default()),
            "The colony is self-sufficient after 60 days. Victory!\n"
        );
    }

    #[test]
    fn test_day_report_uses_summary_snapshot() {
        let mut session = default_session(4);
        let summary = session.advance_day().unwrap();
        session.advance_day().unwrap();

        let mut presenter = Presenter::new(Vec::new(), Format::Json);
        presenter.day(&summary, &session).unwrap();
        let output = String::from_utf8(presenter.into_inner()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(line["summary"]["day"], 1);
        assert_eq!(
            line["resources"]["Food"].as_u64(),
            Some(u64::from(summary.resources.get(ResourceKind::Food)))
        );
        assert_eq!(line["survivors"].as_u64(), Some(summary.population as u64));
    }
}
