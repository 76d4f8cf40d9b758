//! Challenge / player input sequences and the evaluator.

/// Target ordered sequence of symbol indices for one round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Challenge(Vec<usize>);

impl Challenge {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<usize> {
        self.0.get(step).copied()
    }
}

/// Result of recording one symbol selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entry {
    Partial { entered: usize, needed: usize },
    Complete,
    /// Input already holds as many entries as the challenge.
    Full,
}

/// Symbols entered so far; never longer than the challenge it answers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerInput(Vec<usize>);

impl PlayerInput {
    pub fn push(&mut self, index: usize, challenge: &Challenge) -> Entry {
        let needed = challenge.len();
        if self.0.len() >= needed {
            return Entry::Full;
        }
        self.0.push(index);
        if self.0.len() == needed {
            Entry::Complete
        } else {
            Entry::Partial {
                entered: self.0.len(),
                needed,
            }
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Exact, order-sensitive comparison. No partial credit.
pub fn is_match(challenge: &[usize], input: &[usize]) -> bool {
    challenge.len() == input.len() && challenge.iter().zip(input).all(|(a, b)| a == b)
}
