//! Damage-sharing chain membership and the visual links between members.

use hypercube_core::EnemyId;

#[derive(Debug, Default)]
pub(crate) struct Chain {
    members: Vec<EnemyId>,
    links: Vec<(EnemyId, EnemyId)>,
}

impl Chain {
    pub(crate) fn contains(&self, enemy: EnemyId) -> bool {
        self.members.contains(&enemy)
    }

    /// Members in the order they joined.
    pub(crate) fn members(&self) -> &[EnemyId] {
        &self.members
    }

    pub(crate) fn links(&self) -> &[(EnemyId, EnemyId)] {
        &self.links
    }

    /// Adds a member, linking it to `linked_to` when provided.
    pub(crate) fn join(&mut self, enemy: EnemyId, linked_to: Option<EnemyId>) -> bool {
        if self.contains(enemy) {
            return false;
        }
        self.members.push(enemy);
        if let Some(other) = linked_to {
            self.links.push((enemy, other));
        }
        true
    }

    /// Removes a member together with every link touching it.
    pub(crate) fn leave(&mut self, enemy: EnemyId) -> bool {
        let Some(index) = self.members.iter().position(|member| *member == enemy) else {
            return false;
        };
        let _ = self.members.remove(index);
        self.links
            .retain(|(first, second)| *first != enemy && *second != enemy);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaving_drops_links_on_both_ends() {
        let mut chain = Chain::default();
        let (a, b, c) = (EnemyId::new(1), EnemyId::new(2), EnemyId::new(3));

        assert!(chain.join(a, None));
        assert!(chain.join(b, Some(a)));
        assert!(chain.join(c, Some(b)));
        assert!(!chain.join(c, Some(a)), "members join once");

        assert!(chain.leave(b));
        assert_eq!(chain.members(), &[a, c]);
        assert!(chain.links().is_empty());
        assert!(!chain.leave(b));
    }
}
