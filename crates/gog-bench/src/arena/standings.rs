use std::fs;
use std::path::Path;

use super::{GameEnd, GameOutcome};
use crate::config::{AgentConfig, AgentKind};

/// Running totals for one agent across the run.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStanding {
    pub name: String,
    pub kind: AgentKind,
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
    /// Wins where the opponent ran out of moves.
    pub forfeit_wins: usize,
    pub decisions: u64,
    pub decision_ms: f64,
}

impl AgentStanding {
    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }

    pub fn average_ms_per_decision(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.decision_ms / self.decisions as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Standings {
    agents: Vec<AgentStanding>,
    total_plies: u64,
    games: usize,
}

impl Standings {
    pub fn new(agents: &[AgentConfig]) -> Self {
        Self {
            agents: agents
                .iter()
                .map(|agent| AgentStanding {
                    name: agent.name.clone(),
                    kind: agent.kind,
                    games: 0,
                    wins: 0,
                    losses: 0,
                    draws: 0,
                    forfeit_wins: 0,
                    decisions: 0,
                    decision_ms: 0.0,
                })
                .collect(),
            total_plies: 0,
            games: 0,
        }
    }

    pub fn agents(&self) -> &[AgentStanding] {
        &self.agents
    }

    pub fn games(&self) -> usize {
        self.games
    }

    pub fn average_plies(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.total_plies as f64 / self.games as f64
        }
    }

    pub fn record(&mut self, outcome: &GameOutcome) {
        self.games += 1;
        self.total_plies += u64::from(outcome.plies);
        let winner = outcome.winning_agent();

        for (seat, &agent) in outcome.seating.iter().enumerate() {
            let Some(standing) = self.agents.get_mut(agent) else {
                continue;
            };
            standing.games += 1;
            standing.decisions += u64::from(outcome.decisions[seat].decisions);
            standing.decision_ms += outcome.decisions[seat].total_ms;
            match winner {
                Some(w) if w == agent => {
                    standing.wins += 1;
                    if outcome.end == GameEnd::Forfeit {
                        standing.forfeit_wins += 1;
                    }
                }
                Some(_) => standing.losses += 1,
                None => standing.draws += 1,
            }
        }
    }

    pub fn to_markdown(&self, run_id: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Arena Summary: {run_id}\n\n"));
        out.push_str(&format!(
            "Games: {} (average {:.1} plies)\n\n",
            self.games,
            self.average_plies()
        ));
        out.push_str("| Agent | Kind | Games | Wins | Losses | Draws | Forfeit wins | Win % | Avg ms/decision |\n");
        out.push_str("|-------|------|-------|------|--------|-------|--------------|-------|------------------|\n");
        for agent in &self.agents {
            out.push_str(&format!(
                "| {name} | {kind:?} | {games} | {wins} | {losses} | {draws} | {forfeits} | {win:.1}% | {latency:.2} |\n",
                name = agent.name,
                kind = agent.kind,
                games = agent.games,
                wins = agent.wins,
                losses = agent.losses,
                draws = agent.draws,
                forfeits = agent.forfeit_wins,
                win = agent.win_rate() * 100.0,
                latency = agent.average_ms_per_decision(),
            ));
        }
        out
    }

    pub fn write_markdown(&self, run_id: &str, path: impl AsRef<Path>) -> std::io::Result<()> {
        fs::write(path.as_ref(), self.to_markdown(run_id))
    }
}
