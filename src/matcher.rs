//! Backtracking matcher over the AST.
//!
//! Every node implements the same resumption protocol: `attempt(subject,
//! position, state, context)` returns one way of matching at `position` and
//! records in `state` where it left off. Calling it again with the same state
//! produces the next distinct way, or `None` once the node has no
//! alternatives left. A parent backtracks a child by re-invoking the child on
//! its existing state, so the `State` tree is the whole backtracking stack.
//!
//! Positions are signed. Scanning forward, a cursor at `p` reads `subject[p]`
//! and moves to `p + 1`; scanning backward (inside lookbehind) it reads
//! `subject[p]` and moves to `p - 1`, so it may end at `-1`.

use std::collections::BTreeMap;

use log::trace;

use crate::CodePoint;
use crate::ast::{Alternative, Disjunction, Group, Node, Quantifier};
use crate::class;
use crate::compiler::Program;
use crate::flags::Flags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Shared by every node of one attempt. Lookaround matches its body under a
/// copy with the direction replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    pub direction: Direction,
    pub flags: Flags,
}

impl Context {
    pub fn new(flags: Flags) -> Self {
        Context { direction: Direction::Forward, flags }
    }

    fn with_direction(self, direction: Direction) -> Self {
        Context { direction, ..self }
    }

    /// The gap between code points that a cursor at `pos` sits on; gap `g`
    /// lies between `subject[g - 1]` and `subject[g]`.
    fn boundary(&self, pos: isize) -> isize {
        match self.direction {
            Direction::Forward => pos,
            Direction::Backward => pos + 1,
        }
    }
}

/// Half-open code-point range `[start, end)` of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Span covered by moving from `entry` to `exit` in `direction`,
    /// always reported low to high.
    fn traversed(entry: isize, exit: isize, direction: Direction) -> Self {
        let (start, end) = match direction {
            Direction::Forward => (entry, exit),
            Direction::Backward => (exit + 1, entry + 1),
        };
        Span {
            start: start.max(0) as usize,
            end: end.max(0) as usize,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CaptureKey {
    Index(u32),
    Name(String),
}

pub type CaptureMap = BTreeMap<CaptureKey, Span>;

/// One successful way of matching a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Cursor position after the node.
    pub index: isize,
    pub captures: CaptureMap,
}

impl Outcome {
    fn empty(index: isize) -> Self {
        Outcome {
            index,
            captures: CaptureMap::new(),
        }
    }
}

/// Per-node progress record, created on first visit.
#[derive(Debug, Default)]
pub enum State {
    #[default]
    Fresh,
    /// A single-shot node (character atom or assertion) already ran.
    Spent,
    Disjunction(DisjunctionState),
    Alternative(AlternativeState),
    Quantified(QuantifiedState),
}

#[derive(Debug, Default)]
pub struct DisjunctionState {
    branch: usize,
    sub: Box<State>,
    /// Set once the 0-branch disjunction produced its empty match.
    spent: bool,
}

#[derive(Debug, Default)]
pub struct AlternativeState {
    slots: Vec<Slot>,
    started: bool,
    exhausted: bool,
}

#[derive(Debug, Default)]
pub struct QuantifiedState {
    /// One slot per repetition on the current search path.
    reps: Vec<Slot>,
    started: bool,
    exhausted: bool,
}

/// A child's resumable state plus the outcome it last produced.
#[derive(Debug, Default)]
struct Slot {
    state: State,
    outcome: Option<Outcome>,
}

// A node handed the state of another node kind is a bug in the engine.
#[cold]
fn mismatch(expected: &str, found: &State) -> ! {
    unreachable!("{expected} node resumed with foreign state {found:?}")
}

impl State {
    /// True on the first visit of a single-shot node; marks it spent.
    fn first_visit(&mut self) -> bool {
        match self {
            State::Fresh => {
                *self = State::Spent;
                true
            }
            State::Spent => false,
            other => mismatch("single-shot", other),
        }
    }

    fn disjunction(&mut self) -> &mut DisjunctionState {
        if let State::Fresh = self {
            *self = State::Disjunction(DisjunctionState::default());
        }
        match self {
            State::Disjunction(state) => state,
            other => mismatch("disjunction", other),
        }
    }

    fn alternative(&mut self, terms: usize) -> &mut AlternativeState {
        if let State::Fresh = self {
            *self = State::Alternative(AlternativeState {
                slots: (0..terms).map(|_| Slot::default()).collect(),
                ..AlternativeState::default()
            });
        }
        match self {
            State::Alternative(state) => state,
            other => mismatch("alternative", other),
        }
    }

    fn quantified(&mut self) -> &mut QuantifiedState {
        if let State::Fresh = self {
            *self = State::Quantified(QuantifiedState::default());
        }
        match self {
            State::Quantified(state) => state,
            other => mismatch("quantified", other),
        }
    }
}

fn code_point_at(subject: &[CodePoint], pos: isize) -> Option<CodePoint> {
    usize::try_from(pos).ok().and_then(|i| subject.get(i)).copied()
}

/// Captures of `slots` merged in order; later entries win.
fn merge(slots: &[Slot]) -> CaptureMap {
    let mut captures = CaptureMap::new();
    for outcome in slots.iter().filter_map(|slot| slot.outcome.as_ref()) {
        captures.extend(outcome.captures.iter().map(|(k, v)| (k.clone(), *v)));
    }
    captures
}

impl Disjunction {
    pub fn attempt(
        &self,
        subject: &[CodePoint],
        pos: isize,
        state: &mut State,
        ctx: &Context,
    ) -> Option<Outcome> {
        let st = state.disjunction();
        if self.branches.is_empty() {
            if st.spent {
                return None;
            }
            st.spent = true;
            return Some(Outcome::empty(pos));
        }
        while let Some(branch) = self.branches.get(st.branch) {
            if let Some(outcome) = branch.attempt(subject, pos, &mut st.sub, ctx) {
                return Some(outcome);
            }
            st.branch += 1;
            *st.sub = State::Fresh;
        }
        None
    }
}

impl Alternative {
    pub fn attempt(
        &self,
        subject: &[CodePoint],
        pos: isize,
        state: &mut State,
        ctx: &Context,
    ) -> Option<Outcome> {
        let len = self.terms.len() as isize;
        let st = state.alternative(self.terms.len());
        if st.exhausted {
            return None;
        }
        let step = ctx.direction.step();
        let (first, past_end) = match ctx.direction {
            Direction::Forward => (0, len),
            Direction::Backward => (len - 1, -1),
        };
        let last = past_end - step;
        let before_first = first - step;
        // Resuming means the caller wants the next way: backtrack into the
        // final term.
        let mut cur = if st.started { last } else { first };
        st.started = true;

        loop {
            if cur == past_end {
                let index = match st.slots.get(last as usize).and_then(|s| s.outcome.as_ref()) {
                    Some(outcome) if len > 0 => outcome.index,
                    _ => pos,
                };
                return Some(Outcome { index, captures: merge(&st.slots) });
            }
            if cur == before_first {
                st.exhausted = true;
                return None;
            }
            let at = if cur == first {
                pos
            } else {
                st.slots[(cur - step) as usize].outcome.as_ref().map_or(pos, |o| o.index)
            };
            let slot = &mut st.slots[cur as usize];
            match self.terms[cur as usize].attempt(subject, at, &mut slot.state, ctx) {
                Some(outcome) => {
                    slot.outcome = Some(outcome);
                    cur += step;
                }
                None => {
                    *slot = Slot::default();
                    cur -= step;
                }
            }
        }
    }
}

impl Group {
    pub fn attempt(
        &self,
        subject: &[CodePoint],
        pos: isize,
        state: &mut State,
        ctx: &Context,
    ) -> Option<Outcome> {
        let mut outcome = self.body.attempt(subject, pos, state, ctx)?;
        if let Some(index) = self.capture {
            let span = Span::traversed(pos, outcome.index, ctx.direction);
            outcome.captures.insert(CaptureKey::Index(index), span);
            if let Some(name) = &self.name {
                outcome.captures.insert(CaptureKey::Name(name.clone()), span);
            }
        }
        Some(outcome)
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    /// Lazy only: offer to stop at the current depth.
    Visit,
    /// Open a new repetition slot.
    Extend,
    /// Ask the top slot's atom for its next way of matching.
    Attempt,
    /// Abandon the top slot's last outcome and retry it.
    Backtrack,
}

impl QuantifiedState {
    /// Where repetition `count` (0-based) starts.
    fn end_of(&self, count: usize, pos: isize) -> isize {
        match count.checked_sub(1).and_then(|i| self.reps.get(i)) {
            Some(Slot { outcome: Some(outcome), .. }) => outcome.index,
            _ => pos,
        }
    }

    /// The top slot already carries the captures of every repetition below it.
    fn outcome(&self, pos: isize) -> Outcome {
        let captures = match self.reps.last() {
            Some(Slot { outcome: Some(outcome), .. }) => outcome.captures.clone(),
            _ => CaptureMap::new(),
        };
        Outcome {
            index: self.end_of(self.reps.len(), pos),
            captures,
        }
    }
}

/// Depth-first search over repetition counts. A greedy quantifier tries one
/// more repetition before settling for the current count; a lazy one
/// settles first and extends only when resumed. Each repetition is itself
/// backtracked through the atom's own state before its count is given up.
fn attempt_quantified(
    atom: &Node,
    quantifier: &Quantifier,
    subject: &[CodePoint],
    pos: isize,
    state: &mut State,
    ctx: &Context,
) -> Option<Outcome> {
    let min = quantifier.min as usize;
    let st = state.quantified();
    if st.exhausted {
        return None;
    }
    let mut step = match (st.started, quantifier.lazy) {
        (false, false) => Step::Extend,
        (false, true) => Step::Visit,
        (true, false) => Step::Backtrack,
        (true, true) => Step::Extend,
    };
    st.started = true;

    loop {
        step = match step {
            Step::Visit => {
                if st.reps.len() >= min {
                    return Some(st.outcome(pos));
                }
                Step::Extend
            }
            Step::Extend => {
                let count = st.reps.len();
                if quantifier.allows(count + 1) {
                    st.reps.push(Slot::default());
                    Step::Attempt
                } else if !quantifier.lazy && count >= min {
                    return Some(st.outcome(pos));
                } else {
                    Step::Backtrack
                }
            }
            Step::Attempt => {
                let count = st.reps.len() - 1;
                let at = st.end_of(count, pos);
                let (below, top) = st.reps.split_at_mut(count);
                let Some(slot) = top.first_mut() else {
                    st.exhausted = true;
                    return None;
                };
                match atom.attempt(subject, at, &mut slot.state, ctx) {
                    // A repetition past the minimum must consume something,
                    // or `(a*)*` would never stop.
                    Some(outcome) if outcome.index == at && count >= min => Step::Attempt,
                    Some(mut outcome) => {
                        let inherited = below.last().and_then(|prev| prev.outcome.as_ref());
                        if let Some(previous) = inherited.filter(|o| !o.captures.is_empty()) {
                            let mut captures = previous.captures.clone();
                            captures.append(&mut outcome.captures);
                            outcome.captures = captures;
                        }
                        slot.outcome = Some(outcome);
                        if quantifier.lazy { Step::Visit } else { Step::Extend }
                    }
                    None => {
                        st.reps.pop();
                        if !quantifier.lazy && st.reps.len() >= min {
                            return Some(st.outcome(pos));
                        }
                        Step::Backtrack
                    }
                }
            }
            Step::Backtrack => match st.reps.last_mut() {
                Some(slot) => {
                    slot.outcome = None;
                    Step::Attempt
                }
                None => {
                    st.exhausted = true;
                    return None;
                }
            },
        };
    }
}

fn attempt_lookaround(
    body: &Disjunction,
    negated: bool,
    direction: Direction,
    subject: &[CodePoint],
    pos: isize,
    state: &mut State,
    ctx: &Context,
) -> Option<Outcome> {
    if !state.first_visit() {
        return None;
    }
    let boundary = ctx.boundary(pos);
    let start = match direction {
        Direction::Forward => boundary,
        Direction::Backward => boundary - 1,
    };
    let inner = ctx.with_direction(direction);
    let matched = body.attempt(subject, start, &mut State::Fresh, &inner).is_some();
    (matched != negated).then(|| Outcome::empty(pos))
}

fn at_begin(subject: &[CodePoint], boundary: isize, flags: Flags) -> bool {
    boundary == 0
        || (flags.multiline()
            && code_point_at(subject, boundary - 1).is_some_and(class::is_line_terminator))
}

fn at_end(subject: &[CodePoint], boundary: isize, flags: Flags) -> bool {
    boundary == subject.len() as isize
        || (flags.multiline()
            && code_point_at(subject, boundary).is_some_and(class::is_line_terminator))
}

/// Whether the word-ness of the code points on either side of `boundary`
/// differs. A gap with no code point on one side (either end of the
/// subject) is always a boundary.
fn at_word_boundary(subject: &[CodePoint], boundary: isize) -> bool {
    match (code_point_at(subject, boundary - 1), code_point_at(subject, boundary)) {
        (Some(before), Some(after)) => class::is_word_char(before) != class::is_word_char(after),
        _ => true,
    }
}

impl Node {
    pub fn attempt(
        &self,
        subject: &[CodePoint],
        pos: isize,
        state: &mut State,
        ctx: &Context,
    ) -> Option<Outcome> {
        match self {
            Node::Quantified { atom, quantifier } => {
                attempt_quantified(atom, quantifier, subject, pos, state, ctx)
            }
            Node::Group(group) => group.attempt(subject, pos, state, ctx),
            Node::LookAhead { negated, body } => {
                attempt_lookaround(body, *negated, Direction::Forward, subject, pos, state, ctx)
            }
            Node::LookBehind { negated, body } => {
                attempt_lookaround(body, *negated, Direction::Backward, subject, pos, state, ctx)
            }
            // Rejected at compile time; never matches.
            Node::BackReference(_) => None,
            Node::BeginAnchor | Node::EndAnchor | Node::WordBoundary { .. } => {
                if !state.first_visit() {
                    return None;
                }
                let boundary = ctx.boundary(pos);
                let holds = match self {
                    Node::BeginAnchor => at_begin(subject, boundary, ctx.flags),
                    Node::EndAnchor => at_end(subject, boundary, ctx.flags),
                    Node::WordBoundary { negated } => {
                        at_word_boundary(subject, boundary) != *negated
                    }
                    _ => false,
                };
                holds.then(|| Outcome::empty(pos))
            }
            Node::Char(_) | Node::Dot | Node::Class(_) | Node::Predefined(_) => {
                if !state.first_visit() {
                    return None;
                }
                let cp = code_point_at(subject, pos)?;
                let hit = match self {
                    Node::Char(expected) => class::char_matches(*expected, cp, ctx.flags),
                    Node::Dot => class::dot_matches(cp, ctx.flags),
                    Node::Class(class) => class.matches(cp, ctx.flags),
                    Node::Predefined(class) => class.matches(cp),
                    _ => false,
                };
                hit.then(|| Outcome::empty(pos + ctx.direction.step()))
            }
        }
    }
}

/// One anchored attempt of the whole program at `start`, on a fresh state.
pub fn match_at(program: &Program, subject: &[CodePoint], start: usize) -> Option<Outcome> {
    let ctx = Context::new(program.flags);
    let mut state = State::Fresh;
    program.root.attempt(subject, start as isize, &mut state, &ctx)
}

/// Try successive start positions `0..=len` and return the first that
/// matches, with its outcome.
pub fn search(program: &Program, subject: &[CodePoint]) -> Option<(usize, Outcome)> {
    for start in 0..=subject.len() {
        if program.anchored_start && start > 0 {
            break;
        }
        // First-char optimization: skip positions where the required literal can't match.
        if let Some(first) = program.first_char {
            if subject.get(start) != Some(&first) {
                continue;
            }
        }
        trace!("attempting match at {start}");
        if let Some(outcome) = match_at(program, subject, start) {
            return Some((start, outcome));
        }
    }
    None
}
