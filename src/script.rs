//! Line-oriented operation scripts and their replay against a [`RingBuffer`].
//!
//! ```text
//! # comments run to end of line
//! push 1 2 3
//! pop
//! peek
//! full
//! ```

use crate::error::RingError;
use crate::ring_buffer::{RingBuffer, Value};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Op {
    Push(Value),
    Pop,
    Peek,
    Clear,
    Reset,
    IsEmpty,
    IsFull,
    Len,
    Dump,
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Push(_) => "push",
            Op::Pop     => "pop",
            Op::Peek    => "peek",
            Op::Clear   => "clear",
            Op::Reset   => "reset",
            Op::IsEmpty => "empty",
            Op::IsFull  => "full",
            Op::Len     => "len",
            Op::Dump    => "dump",
        }
    }

    pub fn apply(self, buf: &mut RingBuffer) -> Outcome {
        match self {
            Op::Push(v) => Outcome::Value(buf.push(v)),
            Op::Pop     => buf.pop().map_or_else(Outcome::Failed, Outcome::Value),
            Op::Peek    => buf.peek().map_or_else(Outcome::Failed, Outcome::Value),
            Op::Clear   => { buf.clear(); Outcome::Done }
            Op::Reset   => { buf.reset(); Outcome::Done }
            Op::IsEmpty => Outcome::Bool(buf.is_empty()),
            Op::IsFull  => Outcome::Bool(buf.is_full()),
            Op::Len     => Outcome::Count(buf.len()),
            Op::Dump    => Outcome::Contents(buf.iter().collect()),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Push(v) => write!(f, "push {}", v),
            other       => f.write_str(other.name()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unknown operation '{0}'")]
    UnknownOp(String),
    #[error("'{0}' needs at least one value")]
    MissingArgument(&'static str),
    #[error("'{0}' is not an integer")]
    InvalidArgument(String),
    #[error("'{op}' takes no arguments, found '{arg}'")]
    UnexpectedArgument { op: &'static str, arg: String },
}

/// One parsed operation with the 1-based line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScriptOp {
    pub line: usize,
    #[serde(flatten)]
    pub op: Op,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    ops: Vec<ScriptOp>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut ops = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let body = raw.split('#').next().unwrap_or("");
            let mut words = body.split_whitespace();
            let Some(word) = words.next() else { continue };
            let err = |kind| ParseError { line, kind };

            let keyword = word.to_ascii_lowercase();
            let op = match keyword.as_str() {
                "push" => {
                    let mut pushed = 0;
                    for arg in words.by_ref() {
                        let v: Value = arg.parse()
                            .map_err(|_| err(ParseErrorKind::InvalidArgument(arg.to_string())))?;
                        ops.push(ScriptOp { line, op: Op::Push(v) });
                        pushed += 1;
                    }
                    if pushed == 0 {
                        return Err(err(ParseErrorKind::MissingArgument("push")));
                    }
                    continue;
                }
                "pop"   => Op::Pop,
                "peek"  => Op::Peek,
                "clear" => Op::Clear,
                "reset" => Op::Reset,
                "empty" => Op::IsEmpty,
                "full"  => Op::IsFull,
                "len"   => Op::Len,
                "dump"  => Op::Dump,
                _ => return Err(err(ParseErrorKind::UnknownOp(word.to_string()))),
            };
            if let Some(extra) = words.next() {
                return Err(err(ParseErrorKind::UnexpectedArgument { op: op.name(), arg: extra.to_string() }));
            }
            ops.push(ScriptOp { line, op });
        }
        Ok(Self { ops })
    }

    pub fn ops(&self) -> &[ScriptOp] { &self.ops }
    pub fn len(&self) -> usize { self.ops.len() }
    pub fn is_empty(&self) -> bool { self.ops.is_empty() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    Value(Value),
    Bool(bool),
    Count(usize),
    Contents(Vec<Value>),
    Done,
    #[serde(rename = "error")]
    Failed(#[serde(serialize_with = "serialize_error")] RingError),
}

fn serialize_error<S: Serializer>(e: &RingError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(e)
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v)    => write!(f, "{}", v),
            Outcome::Bool(b)     => write!(f, "{}", b),
            Outcome::Count(n)    => write!(f, "{}", n),
            Outcome::Contents(c) => write!(f, "{:?}", c),
            Outcome::Done        => f.write_str("ok"),
            Outcome::Failed(e)   => write!(f, "error: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    #[serde(flatten)]
    pub op: ScriptOp,
    pub outcome: Outcome,
}

impl Step {
    pub fn failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// Replays scripts against an owned buffer.
#[derive(Debug)]
pub struct Runner {
    buffer: RingBuffer,
    keep_going: bool,
}

impl Runner {
    pub fn new(buffer: RingBuffer, keep_going: bool) -> Self {
        Self { buffer, keep_going }
    }

    pub fn into_buffer(self) -> RingBuffer { self.buffer }

    /// Stops after the first underflow unless `keep_going` was set.
    pub fn run(&mut self, script: &Script) -> Vec<Step> {
        let mut steps = Vec::with_capacity(script.len());
        for &op in script.ops() {
            let outcome = op.op.apply(&mut self.buffer);
            let step = Step { op, outcome };
            let stop = step.failed() && !self.keep_going;
            if step.failed() {
                log::debug!("line {}: {} {}", op.line, op.op, step.outcome);
            }
            steps.push(step);
            if stop {
                log::debug!("stopping replay at line {}", op.line);
                break;
            }
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(text: &str) -> Vec<Op> {
        Script::parse(text).unwrap().ops().iter().map(|o| o.op).collect()
    }

    #[test]
    fn parses_every_keyword() {
        let text = "push 1 -2\npop\nPEEK\nclear\nreset\nempty\nfull\nlen\ndump\n";
        assert_eq!(ops(text), vec![
            Op::Push(1), Op::Push(-2), Op::Pop, Op::Peek, Op::Clear, Op::Reset,
            Op::IsEmpty, Op::IsFull, Op::Len, Op::Dump,
        ]);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let script = Script::parse("# header\n\n  push 4 # trailing\n   \npop").unwrap();
        let lines: Vec<_> = script.ops().iter().map(|o| o.line).collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[test]
    fn parse_errors_carry_line_numbers() {
        let e = Script::parse("push 1\nshift\n").unwrap_err();
        assert_eq!(e, ParseError { line: 2, kind: ParseErrorKind::UnknownOp("shift".into()) });

        let e = Script::parse("push").unwrap_err();
        assert_eq!(e.kind, ParseErrorKind::MissingArgument("push"));

        let e = Script::parse("\npush 1 x").unwrap_err();
        assert_eq!(e.line, 2);
        assert_eq!(e.kind, ParseErrorKind::InvalidArgument("x".into()));

        let e = Script::parse("pop 3").unwrap_err();
        assert_eq!(e.to_string(), "line 1: 'pop' takes no arguments, found '3'");
    }

    #[test]
    fn runner_stops_at_first_underflow() {
        let script = Script::parse("push 1\npop\npop\npush 2\n").unwrap();
        let mut runner = Runner::new(RingBuffer::new(0, 2).unwrap(), false);
        let steps = runner.run(&script);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].outcome, Outcome::Value(1));
        assert!(steps[2].failed());
        assert!(runner.into_buffer().is_empty());
    }

    #[test]
    fn runner_keeps_going_when_asked() {
        let script = Script::parse("pop\npush 5\npeek\n").unwrap();
        let mut runner = Runner::new(RingBuffer::new(0, 2).unwrap(), true);
        let steps = runner.run(&script);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].outcome, Outcome::Failed(RingError::EmptyBufferUnderflow { op: "pop" }));
        assert_eq!(steps[2].outcome, Outcome::Value(5));
    }

    #[test]
    fn overwrite_scenario_reports_eviction() {
        let script = Script::parse("push 1 2 3\nfull\npush 4\npeek\ndump\n").unwrap();
        let mut runner = Runner::new(RingBuffer::new(0, 3).unwrap(), false);
        let outcomes: Vec<_> = runner.run(&script).into_iter().map(|s| s.outcome).collect();
        assert_eq!(outcomes, vec![
            Outcome::Value(0), Outcome::Value(0), Outcome::Value(0),
            Outcome::Bool(true),
            Outcome::Value(1),
            Outcome::Value(4),
            Outcome::Contents(vec![4, 3, 2]),
        ]);
    }

    #[test]
    fn steps_serialize_flat() {
        let step = Step {
            op: ScriptOp { line: 2, op: Op::Push(9) },
            outcome: Outcome::Value(0),
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json, serde_json::json!({
            "line": 2, "op": "push", "value": 9,
            "outcome": { "kind": "value", "value": 0 },
        }));

        let failed = Outcome::Failed(RingError::EmptyBufferUnderflow { op: "peek" });
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({ "kind": "error", "value": "cannot peek an empty ring buffer" }),
        );
    }
}
