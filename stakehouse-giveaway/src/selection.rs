use crate::entry::Entry;
use stakehouse_core::RandomSource;
use std::collections::BTreeMap;

/// Pick the winning entry for a roll, if any. Returns an index into
/// `entries`.
///
/// Skill-before-chance cascade: the roll filters candidates, submitted
/// tiebreak values settle same-guess groups, and only the residual ambiguity
/// goes back to the random source. A failed source draw degrades to the
/// earliest-submitted entry instead of aborting the resolution.
pub async fn select_winner(
    roll: u8,
    entries: &[Entry],
    random: &dyn RandomSource,
) -> Option<usize> {
    let candidates: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.covers(roll))
        .map(|(index, _)| index)
        .collect();

    if candidates.is_empty() {
        return None;
    }

    // Entries sharing a guess are tied on the primary number
    let mut groups: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for &index in &candidates {
        groups.entry(entries[index].main).or_default().push(index);
    }

    let mut representatives = Vec::with_capacity(groups.len());
    for members in groups.values() {
        representatives.push(group_representative(members, entries, random).await);
    }

    if representatives.len() == 1 {
        return Some(representatives[0]);
    }

    // Several distinct guesses matched the roll independently
    representatives.sort_unstable();
    Some(draw_from(&representatives, random, "final pick").await)
}

/// Representative of one same-guess group: the highest tiebreak wins
/// outright; equal maxima go to a fresh uniform draw.
async fn group_representative(
    members: &[usize],
    entries: &[Entry],
    random: &dyn RandomSource,
) -> usize {
    if members.len() == 1 {
        return members[0];
    }

    let best = members.iter().map(|&i| entries[i].tiebreak).max().unwrap();
    let tied: Vec<usize> = members
        .iter()
        .copied()
        .filter(|&i| entries[i].tiebreak == best)
        .collect();

    if tied.len() == 1 {
        return tied[0];
    }

    draw_from(&tied, random, "tiebreak").await
}

/// Uniform draw over a non-empty index pool. Degrades to the first
/// (earliest-submitted) index when the source fails; that path is not a fair
/// draw and is logged accordingly.
async fn draw_from(pool: &[usize], random: &dyn RandomSource, stage: &str) -> usize {
    match random.random_int(0, pool.len() as i64 - 1).await {
        Ok(value) if value >= 0 && (value as usize) < pool.len() => pool[value as usize],
        Ok(value) => {
            tracing::warn!(
                "Degraded {} draw: value {} outside pool of {}, using earliest entry",
                stage,
                value,
                pool.len()
            );
            pool[0]
        }
        Err(e) => {
            tracing::warn!(
                "Degraded {} draw, random source failed, using earliest entry: {}",
                stage,
                e
            );
            pool[0]
        }
    }
}
