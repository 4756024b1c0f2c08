//! Session mappings: barcode positions, partner pairs, and imagery.
//!
//! Built wholesale at every reset and immutable for the session's lifetime.

use pairlight_core::{Barcode, LedIndex};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use tracing::{debug, warn};

/// The three immutable per-session mappings.
///
/// `partners` is a symmetric involution over the even-truncated barcode set:
/// if `partner(a) == b` then `partner(b) == a`, and both partners map to the
/// same image.
#[derive(Debug, Clone, Default)]
pub struct Pairing {
    positions: HashMap<Barcode, LedIndex>,
    partners: HashMap<Barcode, Barcode>,
    images: HashMap<Barcode, String>,
}

impl Pairing {
    /// The empty pairing used before the first reset.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build fresh mappings from the loaded barcode source.
    ///
    /// The barcode order and the image list are shuffled independently; the
    /// shuffled barcode list is then walked two at a time to form disjoint
    /// pairs. An odd trailing entry is dropped from pairing (its LED position
    /// stays registered). If fewer images than pairs are available the images
    /// repeat, which is degraded but not fatal.
    pub fn build(
        entries: Vec<(Barcode, LedIndex)>,
        images: &[String],
        rng: &mut impl Rng,
    ) -> Self {
        let positions: HashMap<Barcode, LedIndex> = entries.iter().cloned().collect();

        let mut tokens: Vec<Barcode> = entries.into_iter().map(|(token, _)| token).collect();
        if tokens.len() % 2 != 0
            && let Some(dropped) = tokens.pop()
        {
            debug!("Dropping unpaired trailing barcode '{dropped}'");
        }
        tokens.shuffle(rng);

        let mut image_pool: Vec<String> = images.to_vec();
        image_pool.shuffle(rng);

        let pair_count = tokens.len() / 2;
        if pair_count > 0 {
            if image_pool.is_empty() {
                warn!("No images available; pairs will have no imagery");
            } else if image_pool.len() < pair_count {
                warn!(
                    "Fewer images ({}) than pairs ({}); images will repeat",
                    image_pool.len(),
                    pair_count
                );
            }
        }

        let mut partners = HashMap::with_capacity(tokens.len());
        let mut image_map = HashMap::with_capacity(tokens.len());
        for (i, pair) in tokens.chunks_exact(2).enumerate() {
            let (first, second) = (&pair[0], &pair[1]);
            partners.insert(first.clone(), second.clone());
            partners.insert(second.clone(), first.clone());

            if !image_pool.is_empty() {
                let image = image_pool[i % image_pool.len()].clone();
                image_map.insert(first.clone(), image.clone());
                image_map.insert(second.clone(), image);
            }
        }

        Self {
            positions,
            partners,
            images: image_map,
        }
    }

    /// The partner of a token, if the token takes part in the pairing.
    #[must_use]
    pub fn partner(&self, token: &Barcode) -> Option<&Barcode> {
        self.partners.get(token)
    }

    /// The LED position registered for a token.
    #[must_use]
    pub fn position(&self, token: &Barcode) -> Option<LedIndex> {
        self.positions.get(token).copied()
    }

    /// The image identifier assigned to a token's pair.
    #[must_use]
    pub fn image(&self, token: &Barcode) -> Option<&str> {
        self.images.get(token).map(String::as_str)
    }

    /// Every token taking part in the pairing.
    pub fn members(&self) -> impl Iterator<Item = &Barcode> {
        self.partners.keys()
    }

    /// Every registered LED position, including one belonging to a dropped
    /// odd trailing entry.
    #[must_use]
    pub fn registered_positions(&self) -> Vec<LedIndex> {
        self.positions.values().copied().collect()
    }

    /// Number of disjoint pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.partners.len() / 2
    }

    /// Whether the pairing holds no pairs at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entries(count: u16) -> Vec<(Barcode, LedIndex)> {
        (0..count)
            .map(|i| {
                (
                    Barcode::new(&format!("code-{i}")).unwrap(),
                    LedIndex::new(i).unwrap(),
                )
            })
            .collect()
    }

    fn images(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("img-{i}.png")).collect()
    }

    #[test]
    fn test_pairing_is_involution() {
        let mut rng = StdRng::seed_from_u64(7);
        let pairing = Pairing::build(entries(8), &images(4), &mut rng);

        assert_eq!(pairing.pair_count(), 4);
        for token in pairing.members() {
            let partner = pairing.partner(token).unwrap();
            assert_ne!(partner, token);
            assert_eq!(pairing.partner(partner), Some(token));
        }
    }

    #[test]
    fn test_odd_trailing_entry_dropped_from_pairing() {
        let mut rng = StdRng::seed_from_u64(7);
        let pairing = Pairing::build(entries(5), &images(2), &mut rng);

        assert_eq!(pairing.pair_count(), 2);
        assert_eq!(pairing.members().count(), 4);
        // The dropped entry keeps its registered position.
        assert_eq!(pairing.registered_positions().len(), 5);
        let last = Barcode::new("code-4").unwrap();
        assert!(pairing.partner(&last).is_none());
        assert!(pairing.position(&last).is_some());
    }

    #[test]
    fn test_partners_share_an_image() {
        let mut rng = StdRng::seed_from_u64(42);
        let pairing = Pairing::build(entries(6), &images(3), &mut rng);

        for token in pairing.members() {
            let partner = pairing.partner(token).unwrap();
            assert_eq!(pairing.image(token), pairing.image(partner));
        }
    }

    #[test]
    fn test_images_repeat_when_scarce() {
        let mut rng = StdRng::seed_from_u64(3);
        let pairing = Pairing::build(entries(6), &images(1), &mut rng);

        for token in pairing.members() {
            assert_eq!(pairing.image(token), Some("img-0.png"));
        }
    }

    #[test]
    fn test_no_images_is_degraded_not_fatal() {
        let mut rng = StdRng::seed_from_u64(3);
        let pairing = Pairing::build(entries(4), &[], &mut rng);

        assert_eq!(pairing.pair_count(), 2);
        for token in pairing.members() {
            assert!(pairing.image(token).is_none());
        }
    }

    #[test]
    fn test_empty_source_builds_empty_pairing() {
        let mut rng = StdRng::seed_from_u64(3);
        let pairing = Pairing::build(Vec::new(), &images(2), &mut rng);

        assert!(pairing.is_empty());
        assert!(pairing.registered_positions().is_empty());
    }

    #[test]
    fn test_build_is_deterministic_per_seed() {
        let first = Pairing::build(entries(8), &images(4), &mut StdRng::seed_from_u64(1));
        let second = Pairing::build(entries(8), &images(4), &mut StdRng::seed_from_u64(1));

        for token in first.members() {
            assert_eq!(first.partner(token), second.partner(token));
            assert_eq!(first.image(token), second.image(token));
        }
    }
}
