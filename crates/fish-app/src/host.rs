//! Line-oriented terminal front end.
//!
//! The host owns the engine and drives it one inbound call at a time. Engine
//! notifications are collected by [`Narrator`] and written out after each
//! call, so the engine itself never touches I/O.

use crate::config::AppConfig;
use fish_core::AppInfo;
use fish_core::bot::{AskPolicy, RandomAskPolicy};
use fish_core::game::{Engine, EngineError, GameListener, GameSummary, Phase, TurnOrder};
use fish_core::model::card::Card;
use fish_core::model::player::{PLAYER_COUNT, Seat};
use fish_core::model::rank::{ParseRankError, Rank};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::{Level, event};

const HELP: &str = "Commands: <player> <rank> (player by name or seat 1-3, e.g. 'Alice 7' or '2 K'), \
hand, scores, help, quit. Press Enter to continue when prompted.";

#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("no player called '{0}'")]
    UnknownTarget(String),
    #[error(transparent)]
    InvalidRank(#[from] ParseRankError),
    #[error("no legal ask available for the human seat")]
    NoLegalAsk,
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    /// Input mistakes are reported and the prompt repeats.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HostError::UnknownCommand(_)
                | HostError::MissingArgument(_)
                | HostError::UnknownTarget(_)
                | HostError::InvalidRank(_)
                | HostError::Engine(EngineError::IllegalAsk(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ask { target: Seat, rank: Rank },
    Hand,
    Scores,
    Help,
    /// An empty line.
    Continue,
    Quit,
}

pub fn parse_command(line: &str, names: &[String; PLAYER_COUNT]) -> Result<Command, HostError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Ok(Command::Continue),
        [single] => match single.to_ascii_lowercase().as_str() {
            "hand" | "h" => Ok(Command::Hand),
            "scores" | "s" => Ok(Command::Scores),
            "help" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            _ if parse_target(single, names).is_ok() => Err(HostError::MissingArgument("rank")),
            _ => Err(HostError::UnknownCommand(single.to_string())),
        },
        [target, rank] => Ok(Command::Ask {
            target: parse_target(target, names)?,
            rank: parse_rank(rank)?,
        }),
        _ => Err(HostError::UnknownCommand(line.trim().to_string())),
    }
}

fn parse_target(word: &str, names: &[String; PLAYER_COUNT]) -> Result<Seat, HostError> {
    if let Ok(number) = word.parse::<usize>() {
        return match number {
            1..=3 => Seat::from_index(number).ok_or_else(|| HostError::UnknownTarget(word.into())),
            _ => Err(HostError::UnknownTarget(word.to_string())),
        };
    }
    names
        .iter()
        .position(|name| name.eq_ignore_ascii_case(word))
        .and_then(Seat::from_index)
        .ok_or_else(|| HostError::UnknownTarget(word.to_string()))
}

/// Accepts plurals such as "7s" or "kings".
fn parse_rank(word: &str) -> Result<Rank, HostError> {
    match word.parse::<Rank>() {
        Ok(rank) => Ok(rank),
        Err(err) => word
            .strip_suffix('s')
            .or_else(|| word.strip_suffix('S'))
            .and_then(|stem| stem.parse::<Rank>().ok())
            .ok_or(HostError::InvalidRank(err)),
    }
}

/// Turns engine notifications into transcript lines.
#[derive(Debug, Clone)]
pub struct Narrator {
    names: [String; PLAYER_COUNT],
    scores: [u32; PLAYER_COUNT],
    lines: Vec<String>,
}

impl Narrator {
    pub fn new(names: [String; PLAYER_COUNT]) -> Self {
        Self {
            names,
            scores: [0; PLAYER_COUNT],
            lines: Vec::new(),
        }
    }

    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    fn name(&self, seat: Seat) -> &str {
        &self.names[seat.index()]
    }

    fn score_line(&self) -> String {
        Seat::LOOP
            .iter()
            .map(|&seat| format!("{} {}", self.name(seat), self.scores[seat.index()]))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl GameListener for Narrator {
    fn on_round_started(&mut self, round: u8, order: &TurnOrder) {
        let order = order
            .seats()
            .iter()
            .map(|&seat| self.name(seat))
            .collect::<Vec<_>>()
            .join(" -> ");
        self.lines.push(format!("=== Round {round} === ({order})"));
    }

    fn on_card_drawn(&mut self, seat: Seat, card: Card) {
        let line = if seat.is_human() {
            format!("You draw the {}.", card.long_name())
        } else {
            format!("{} draws a card.", self.name(seat))
        };
        self.lines.push(line);
    }

    fn on_ask_resolved(
        &mut self,
        asker: Seat,
        target: Seat,
        rank: Rank,
        success: bool,
        transferred: usize,
    ) {
        let outcome = if success {
            format!("takes {transferred}.")
        } else {
            "Go fish!".to_string()
        };
        let line = format!(
            "{} asks {} for {rank}s: {outcome}",
            self.name(asker),
            self.name(target)
        );
        self.lines.push(line);
    }

    fn on_set_scored(&mut self, seat: Seat, rank: Rank) {
        let line = format!("{} completed a set of {rank}s!", self.name(seat));
        self.lines.push(line);
    }

    fn on_scores_changed(&mut self, human: u32, bots: [u32; 3]) {
        self.scores[Seat::Human.index()] = human;
        for (seat, score) in Seat::BOTS.into_iter().zip(bots) {
            self.scores[seat.index()] = score;
        }
    }

    fn on_deck_exhausted(&mut self) {
        self.lines.push("The deck is empty.".to_string());
    }

    fn on_turn_skipped(&mut self, seat: Seat) {
        let line = format!("{} has no move and passes.", self.name(seat));
        self.lines.push(line);
    }

    fn on_round_over(&mut self, round: u8) {
        let line = format!("Round {round} over. Scores: {}", self.score_line());
        self.lines.push(line);
    }

    fn on_game_over(&mut self, winners: &[String], final_scores: &[u32; PLAYER_COUNT]) {
        self.scores = *final_scores;
        let label = if winners.len() > 1 { "Winners" } else { "Winner" };
        let line = format!(
            "Game over! {label}: {}. Final scores: {}",
            winners.join(", "),
            self.score_line()
        );
        self.lines.push(line);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: GameSummary,
    pub quit: bool,
}

pub struct Host<R, W> {
    engine: Engine<Narrator>,
    input: R,
    output: W,
    auto: bool,
    autopilot: RandomAskPolicy,
    autopilot_rng: StdRng,
}

impl<R: BufRead, W: Write> Host<R, W> {
    pub fn new(config: &AppConfig, input: R, output: W) -> Self {
        let names = config.seat_names();
        let seed = config.seed.unwrap_or_else(rand::random);
        let engine = Engine::with_seed(Narrator::new(names.clone()), seed).with_names(names);
        Self {
            engine,
            input,
            output,
            auto: config.auto,
            autopilot: RandomAskPolicy,
            autopilot_rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Plays until the game ends, the user quits or input runs out.
    pub fn run(&mut self) -> Result<RunOutcome, HostError> {
        event!(
            target: "fish_app::host",
            Level::INFO,
            seed = self.engine.seed(),
            auto = self.auto,
            "game starting"
        );
        writeln!(
            self.output,
            "{} ({}) seed {}",
            AppInfo::name(),
            AppInfo::codename(),
            self.engine.seed()
        )?;
        self.engine.start_game()?;

        loop {
            self.flush_narration()?;
            let flow = match self.engine.phase() {
                Phase::GameOver => break,
                Phase::ScorePending => self.acknowledge()?,
                Phase::RoundOver => self.next_round()?,
                Phase::AwaitingAction if self.engine.current_seat().is_human() => {
                    self.human_turn()?
                }
                Phase::AwaitingAction => {
                    self.engine.bot_take_turn()?;
                    Flow::Continue
                }
                Phase::NotStarted => {
                    self.engine.start_game()?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                self.flush_narration()?;
                writeln!(self.output, "Goodbye.")?;
                event!(
                    target: "fish_app::host",
                    Level::INFO,
                    round = self.engine.round_number(),
                    "player quit"
                );
                return Ok(RunOutcome {
                    summary: self.engine.summary(),
                    quit: true,
                });
            }
        }

        self.flush_narration()?;
        self.output.flush()?;
        Ok(RunOutcome {
            summary: self.engine.summary(),
            quit: false,
        })
    }

    fn acknowledge(&mut self) -> Result<Flow, HostError> {
        if !self.auto && self.wait_for_enter("Press Enter to collect the set.")? == Flow::Quit {
            return Ok(Flow::Quit);
        }
        self.engine.acknowledge_score_event()?;
        Ok(Flow::Continue)
    }

    fn next_round(&mut self) -> Result<Flow, HostError> {
        if !self.auto {
            let prompt = format!(
                "Press Enter to start round {}.",
                self.engine.round_number() + 1
            );
            if self.wait_for_enter(&prompt)? == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }
        self.engine.advance_to_next_round()?;
        Ok(Flow::Continue)
    }

    fn human_turn(&mut self) -> Result<Flow, HostError> {
        if self.auto {
            let ask = {
                let ctx = self.engine.ask_context(Seat::Human);
                self.autopilot.choose_ask(&ctx, &mut self.autopilot_rng)
            }
            .ok_or(HostError::NoLegalAsk)?;
            self.engine.human_ask(ask.target, ask.rank)?;
            return Ok(Flow::Continue);
        }

        self.show_hand()?;
        loop {
            write!(self.output, "Your turn. Ask: ")?;
            let Some(line) = self.read_line()? else {
                return Ok(Flow::Quit);
            };
            match self.handle_line(&line)? {
                Some(Command::Ask { target, rank }) => {
                    match self.engine.human_ask(target, rank) {
                        Ok(_) => return Ok(Flow::Continue),
                        Err(EngineError::IllegalAsk(reason)) => {
                            writeln!(self.output, "Not allowed: {reason}")?;
                        }
                        Err(other) => return Err(other.into()),
                    }
                }
                Some(Command::Quit) => return Ok(Flow::Quit),
                _ => {}
            }
        }
    }

    fn wait_for_enter(&mut self, prompt: &str) -> Result<Flow, HostError> {
        loop {
            write!(self.output, "{prompt} ")?;
            let Some(line) = self.read_line()? else {
                return Ok(Flow::Quit);
            };
            match self.handle_line(&line)? {
                Some(Command::Continue) => return Ok(Flow::Continue),
                Some(Command::Quit) => return Ok(Flow::Quit),
                Some(Command::Ask { .. }) => {
                    writeln!(self.output, "Not now; the game is waiting for Enter.")?;
                }
                _ => {}
            }
        }
    }

    /// Parses a line and answers the informational commands in place.
    /// Recoverable errors are printed and yield `None`.
    fn handle_line(&mut self, line: &str) -> Result<Option<Command>, HostError> {
        let names = self.engine.participants().each_ref().map(|p| p.name().to_string());
        match parse_command(line, &names) {
            Ok(Command::Hand) => self.show_hand()?,
            Ok(Command::Scores) => self.show_scores()?,
            Ok(Command::Help) => writeln!(self.output, "{HELP}")?,
            Ok(command) => return Ok(Some(command)),
            Err(err) if err.is_recoverable() => writeln!(self.output, "{err}")?,
            Err(err) => return Err(err),
        }
        Ok(None)
    }

    fn read_line(&mut self) -> Result<Option<String>, HostError> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn show_hand(&mut self) -> Result<(), HostError> {
        let cards = self
            .engine
            .hand(Seat::Human)
            .iter()
            .map(Card::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(
            self.output,
            "Your hand: {cards} (deck: {})",
            self.engine.deck().len()
        )?;
        Ok(())
    }

    fn show_scores(&mut self) -> Result<(), HostError> {
        let line = self.engine.listener().score_line();
        writeln!(
            self.output,
            "Round {}, sets this round {}. Scores: {line}",
            self.engine.round_number(),
            self.engine.points_this_round()
        )?;
        Ok(())
    }

    fn flush_narration(&mut self) -> Result<(), HostError> {
        for line in self.engine.listener_mut().take_lines() {
            writeln!(self.output, "{line}")?;
        }
        Ok(())
    }
}
