/// Hands out consecutive row ids.
///
/// One sequence per table, owned by the writer for a single run, so two runs
/// never share counters.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: i64,
}

impl IdSequence {
    pub fn starting_at(first: i64) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Id the next call to [`IdSequence::next_id`] will return.
    pub fn peek(&self) -> i64 {
        self.next
    }
}
