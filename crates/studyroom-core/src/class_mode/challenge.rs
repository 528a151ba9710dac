//! Micro-challenges handed out at the start of a class.

use rand::Rng;

use super::MicroChallenge;
use crate::clock::new_id;

/// `(description, points)`.
const CHALLENGES: [(&str, u32); 10] = [
    ("Write down 3 examples given by the teacher", 15),
    ("Spot 1 key definition and note it", 15),
    ("Draft 1 question to ask at the end", 15),
    ("Sketch a diagram of the main concept", 20),
    ("Note 5 important keywords", 10),
    ("Summarise the class in 3 points at the end", 15),
    ("Find a link with a previous class", 20),
    ("Note a practical application of the concept", 15),
    ("Rephrase a complex idea in your own words", 20),
    ("Ask 1 clarifying question", 15),
];

fn build(description: &str, points: u32) -> MicroChallenge {
    MicroChallenge {
        id: new_id(),
        description: description.to_string(),
        completed: false,
        points,
    }
}

/// Uniformly pick one challenge.
pub fn random_challenge<R: Rng + ?Sized>(rng: &mut R) -> MicroChallenge {
    let (description, points) = CHALLENGES[rng.gen_range(0..CHALLENGES.len())];
    build(description, points)
}

pub fn challenge_by_description(description: &str) -> Option<MicroChallenge> {
    CHALLENGES
        .iter()
        .find(|(d, _)| *d == description)
        .map(|(d, p)| build(d, *p))
}

pub fn all_challenges() -> Vec<MicroChallenge> {
    CHALLENGES.iter().map(|(d, p)| build(d, *p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn random_pick_comes_from_catalog() {
        let mut rng = Pcg64::seed_from_u64(7);
        let catalog: Vec<String> = all_challenges().into_iter().map(|c| c.description).collect();
        for _ in 0..50 {
            let c = random_challenge(&mut rng);
            assert!(catalog.contains(&c.description));
            assert!(!c.completed);
            assert!(matches!(c.points, 10 | 15 | 20));
        }
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = random_challenge(&mut Pcg64::seed_from_u64(42));
        let b = random_challenge(&mut Pcg64::seed_from_u64(42));
        assert_eq!(a.description, b.description);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn lookup_by_description() {
        let c = challenge_by_description("Note 5 important keywords").unwrap();
        assert_eq!(c.points, 10);
        assert!(challenge_by_description("Juggle").is_none());
    }
}
