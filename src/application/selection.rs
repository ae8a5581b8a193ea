use rand::Rng;

/// Picks the winning index out of a non-empty participant list.
pub trait WinnerSelector: Send + Sync {
    /// Returns an index into `participants`, or `None` if it is empty.
    fn pick(&self, participants: &[String]) -> Option<usize>;
}

/// Uniform draw from the thread-local generator.
///
/// Each call is independent: the generator is seeded from the OS per thread,
/// never from a shared fixed seed.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl WinnerSelector for RandomSelector {
    fn pick(&self, participants: &[String]) -> Option<usize> {
        if participants.is_empty() {
            return None;
        }
        Some(rand::thread_rng().gen_range(0..participants.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_empty_list_has_no_winner() {
        assert_eq!(RandomSelector.pick(&[]), None);
    }

    #[test]
    fn test_pick_stays_in_range_and_varies() {
        let participants: Vec<String> = (0..8).map(|i| format!("p{i}")).collect();
        let picks: HashSet<usize> = (0..500)
            .map(|_| RandomSelector.pick(&participants).unwrap())
            .collect();
        assert!(picks.iter().all(|&i| i < participants.len()));
        assert!(picks.len() > 1, "draws should not repeat a single index");
    }
}
