use super::BotDifficulty;
use makao_core::game::controller::TurnView;
use makao_core::model::player::Status;

pub struct PlayPlanner;

impl PlayPlanner {
    /// Hand indexes to play, in pile order, or `None` to pass.
    pub fn choose(view: &TurnView<'_>, difficulty: BotDifficulty) -> Option<Vec<usize>> {
        let playable = view.playable_indexes();
        let first = *playable.first()?;

        let single_only = view.player.status() != Status::Clear || view.player.is_restricted();
        if single_only || difficulty == BotDifficulty::Easy {
            return Some(vec![first]);
        }

        playable
            .iter()
            .map(|&index| Self::same_rank_group(view, index))
            .fold(None, |best: Option<Vec<usize>>, group| match best {
                Some(best) if best.len() >= group.len() => Some(best),
                _ => Some(group),
            })
    }

    /// `lead` followed by every other card of its rank; same-rank cards always
    /// follow one another, so the group is a legal combo whenever `lead` is.
    fn same_rank_group(view: &TurnView<'_>, lead: usize) -> Vec<usize> {
        let cards = view.hand().cards();
        let rank = cards[lead].rank;
        let mut group = vec![lead];
        group.extend(
            cards
                .iter()
                .enumerate()
                .filter(|&(index, card)| index != lead && card.rank == rank)
                .map(|(index, _)| index),
        );
        group
    }
}
