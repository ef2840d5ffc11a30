use std::collections::HashMap;
use std::iter;

/// Discovery provenance for one direction. The origin maps to `None`.
pub type ParentMap = HashMap<String, Option<String>>;

/// Join the two halves of a meeting into one start-to-end title sequence.
///
/// The forward half is walked from `meeting` back to the forward origin and
/// reversed. The backward half starts at the meeting title's backward parent
/// (so `meeting` appears once) and walks on to the backward origin.
pub fn reconstruct_path(meeting: &str, forward: &ParentMap, backward: &ParentMap) -> Vec<String> {
    let parent_in =
        |map: &ParentMap, title: &str| -> Option<String> { map.get(title).cloned().flatten() };

    let mut path: Vec<String> =
        iter::successors(Some(meeting.to_string()), |title| parent_in(forward, title)).collect();
    path.reverse();

    path.extend(iter::successors(parent_in(backward, meeting), |title| {
        parent_in(backward, title)
    }));

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parents(entries: &[(&str, Option<&str>)]) -> ParentMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_joins_both_halves() {
        let forward = parents(&[("A", None), ("B", Some("A")), ("C", Some("B"))]);
        let backward = parents(&[("E", None), ("D", Some("E")), ("C", Some("D"))]);

        assert_eq!(
            reconstruct_path("C", &forward, &backward),
            vec!["A", "B", "C", "D", "E"]
        );
    }

    #[test]
    fn test_meeting_at_end() {
        let forward = parents(&[("A", None), ("B", Some("A"))]);
        let backward = parents(&[("B", None)]);

        assert_eq!(reconstruct_path("B", &forward, &backward), vec!["A", "B"]);
    }

    #[test]
    fn test_meeting_at_start() {
        let forward = parents(&[("A", None)]);
        let backward = parents(&[("B", None), ("A", Some("B"))]);

        assert_eq!(reconstruct_path("A", &forward, &backward), vec!["A", "B"]);
    }

    #[test]
    fn test_single_title() {
        let forward = parents(&[("A", None)]);
        let backward = parents(&[("A", None)]);

        assert_eq!(reconstruct_path("A", &forward, &backward), vec!["A"]);
    }
}
