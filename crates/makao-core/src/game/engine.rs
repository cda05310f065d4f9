use crate::game::controller::{Controller, DrawnCardDecision, Move, MoveError, TurnView};
use crate::game::event::GameEvent;
use crate::game::snapshot::TableSnapshot;
use crate::model::card::Card;
use crate::model::deck::{Deck, DeckError};
use crate::model::pile::{Addressing, CardEffect, Pile};
use crate::model::player::{PlayerState, Seat, Status, transfer_effect};
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use thiserror::Error;
use tracing::{Level, event};

pub const MIN_OPPONENTS: usize = 1;
pub const MAX_OPPONENTS: usize = 3;
pub const STARTING_HAND: usize = 5;
pub const KING_DRAW: u32 = 5;
pub const LAST_CARD_PENALTY: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("the number of opponents has to be between 1 and 3, got {0}")]
    InvalidOpponentCount(usize),
    #[error("expected {expected} controllers, got {actual}")]
    ControllerCountMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Deck(#[from] DeckError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Rejected moves in a row before the engine passes on the player's behalf.
    pub max_invalid_attempts: u32,
    /// Only ranks 5..=10 may be forced with a Jack.
    pub enforce_jack_range: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_invalid_attempts: 16,
            enforce_jack_range: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Played { seat: Seat, events: Vec<GameEvent> },
    Skipped(Seat),
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// Finishing order followed by whoever was left holding cards.
    pub ranking: Vec<Seat>,
    pub winners: Vec<Seat>,
    pub turns: u64,
    pub stalled: bool,
}

#[derive(Debug, Clone)]
pub struct TurnEngine {
    players: Vec<PlayerState>,
    turn_index: u64,
    deck: Deck,
    pile: Pile,
    winners: Vec<Seat>,
    config: EngineConfig,
    seed: u64,
    events: Vec<GameEvent>,
}

impl TurnEngine {
    /// Seats `player_name` first, followed by `opponents` automated seats.
    pub fn new(player_name: &str, opponents: usize, seed: u64) -> Result<Self, EngineError> {
        Self::with_config(table_names(player_name, opponents), seed, EngineConfig::default())
    }

    pub fn with_config(
        names: Vec<String>,
        seed: u64,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        check_table_size(names.len())?;
        let mut deck = Deck::shuffled_with_seed(seed);
        let pile = Pile::new(deck.draw_fresh()?);
        let mut players: Vec<PlayerState> = names.into_iter().map(PlayerState::new).collect();
        for _ in 0..STARTING_HAND {
            for player in players.iter_mut() {
                player.add_card(deck.draw_fresh()?);
            }
        }

        Ok(Self {
            players,
            turn_index: 0,
            deck,
            pile,
            winners: Vec::new(),
            config,
            seed,
            events: Vec::new(),
        })
    }

    /// Builds an engine around an already arranged table.
    pub fn from_parts(
        players: Vec<PlayerState>,
        deck: Deck,
        pile: Pile,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        check_table_size(players.len())?;
        Ok(Self {
            players,
            turn_index: 0,
            deck,
            pile,
            winners: Vec::new(),
            config,
            seed: 0,
            events: Vec::new(),
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, seat: Seat) -> &PlayerState {
        &self.players[seat.index()]
    }

    pub fn pile(&self) -> &Pile {
        &self.pile
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn turn_index(&self) -> u64 {
        self.turn_index
    }

    pub fn winners(&self) -> &[Seat] {
        &self.winners
    }

    /// Strict round-robin; blocked and finished players still own their index.
    pub fn current_seat(&self) -> Seat {
        Seat::new((self.turn_index % self.players.len() as u64) as u8)
    }

    pub fn is_finished(&self) -> bool {
        self.winners.len() + 1 >= self.players.len()
    }

    pub fn ranking(&self) -> Vec<Seat> {
        let mut ranking = self.winners.clone();
        ranking.extend(Seat::all(self.players.len()).filter(|seat| !self.winners.contains(seat)));
        ranking
    }

    pub fn view(&self, seat: Seat) -> TurnView<'_> {
        TurnView {
            seat,
            player: &self.players[seat.index()],
            players: &self.players,
            pile: &self.pile,
            deck_len: self.deck.len(),
        }
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot::capture(self)
    }

    /// Closest player before `seat` who is neither blocked nor finished.
    pub fn previous_active(&self, seat: Seat) -> Seat {
        self.walk_active(seat, Seat::previous)
    }

    /// Closest player after `seat` who is neither blocked nor finished.
    pub fn next_active(&self, seat: Seat) -> Seat {
        self.walk_active(seat, Seat::next)
    }

    fn walk_active(&self, from: Seat, step: fn(Seat, usize) -> Seat) -> Seat {
        let count = self.players.len();
        let first = step(from, count);

        let mut candidate = first;
        for _ in 1..count {
            let player = &self.players[candidate.index()];
            if !player.is_blocked() && !player.has_won() {
                return candidate;
            }
            candidate = step(candidate, count);
        }

        // Everybody else is blocked or out: settle for the nearest player still holding cards.
        let mut candidate = first;
        for _ in 1..count {
            if !self.players[candidate.index()].has_won() {
                return candidate;
            }
            candidate = step(candidate, count);
        }
        first
    }

    fn contenders(&self) -> Vec<Seat> {
        Seat::all(self.players.len())
            .filter(|seat| !self.players[seat.index()].has_won())
            .collect()
    }

    /// Plays turns until the game ends or `max_turns` turn indexes were consumed.
    pub fn run(
        &mut self,
        controllers: &mut [Box<dyn Controller>],
        max_turns: u64,
    ) -> Result<GameResult, EngineError> {
        let mut consumed = 0;
        while !self.is_finished() {
            if consumed >= max_turns {
                event!(
                    target: "makao_core::engine",
                    Level::WARN,
                    turns = consumed,
                    "turn limit reached, stopping the game"
                );
                return Ok(self.result(true));
            }
            self.step(controllers)?;
            consumed += 1;
        }
        Ok(self.result(false))
    }

    fn result(&self, stalled: bool) -> GameResult {
        GameResult {
            ranking: self.ranking(),
            winners: self.winners.clone(),
            turns: self.turn_index,
            stalled,
        }
    }

    /// Runs exactly one turn index to completion, including any nested sub-turn.
    pub fn step(&mut self, controllers: &mut [Box<dyn Controller>]) -> Result<Step, EngineError> {
        if controllers.len() != self.players.len() {
            return Err(EngineError::ControllerCountMismatch {
                expected: self.players.len(),
                actual: controllers.len(),
            });
        }
        if self.is_finished() {
            return Ok(Step::Finished);
        }

        let seat = self.current_seat();
        if self.players[seat.index()].has_won() {
            self.turn_index += 1;
            return Ok(Step::Skipped(seat));
        }

        let span = tracing::info_span!(
            target: "makao_core::engine",
            "turn",
            index = self.turn_index,
            seat = seat.index()
        );
        let _entered = span.enter();

        self.emit(
            controllers,
            GameEvent::TurnStarted {
                seat,
                turn: self.turn_index,
            },
        );
        let played_jack = self.take_turn(seat, controllers);
        self.close_turn(seat, played_jack, controllers);

        if self.is_finished() {
            let ranking = self.ranking();
            self.emit(controllers, GameEvent::GameFinished { ranking });
        }
        if tracing::enabled!(target: "makao_core::engine", Level::TRACE) {
            if let Ok(json) = self.snapshot().to_json() {
                event!(target: "makao_core::engine", Level::TRACE, snapshot = %json);
            }
        }

        self.turn_index += 1;
        Ok(Step::Played {
            seat,
            events: std::mem::take(&mut self.events),
        })
    }

    /// Briefing, move collection and resolution for one player. Returns
    /// whether the player ended the turn by playing a Jack.
    fn take_turn(&mut self, seat: Seat, controllers: &mut [Box<dyn Controller>]) -> bool {
        self.players[seat.index()].reset_declaration();
        if self.players[seat.index()].status() != Status::Clear {
            self.brief(seat, controllers);
        }

        match self.collect_move(seat, controllers) {
            Move::Pass => self.resolve_pass(seat, controllers),
            Move::Play {
                indexes,
                declare_last_card,
            } => self.resolve_play(seat, &indexes, declare_last_card, controllers),
        }
    }

    fn brief(&mut self, seat: Seat, controllers: &mut [Box<dyn Controller>]) {
        let forced_rank = self.pile.forced_rank();
        let player = &mut self.players[seat.index()];
        let status = player.status();
        match (status, forced_rank) {
            (Status::ForcedRank, Some(rank)) => player.set_allowed_ranks(vec![rank]),
            (Status::ForcedRank, None) => {}
            (other, _) => player.set_allowed_ranks(other.escape_ranks()),
        }

        let briefing = GameEvent::Briefed {
            seat,
            status,
            draw_debt: player.draw_debt(),
            block_turns_left: player.block_turns_left(),
            can_escape: status != Status::Blocked
                || player.block_turns_left() == player.block_turns_total(),
        };
        self.emit(controllers, briefing);
    }

    fn collect_move(&mut self, seat: Seat, controllers: &mut [Box<dyn Controller>]) -> Move {
        let controller = &mut controllers[seat.index()];
        for _ in 0..self.config.max_invalid_attempts.max(1) {
            let view = self.view(seat);
            let submitted = controller.choose_move(&view);
            match self.validate(seat, &submitted) {
                Ok(()) => return submitted,
                Err(error) => {
                    event!(
                        target: "makao_core::engine",
                        Level::DEBUG,
                        seat = seat.index(),
                        %error,
                        "move rejected"
                    );
                    controller.reject(&view, &error);
                }
            }
        }
        event!(
            target: "makao_core::engine",
            Level::WARN,
            seat = seat.index(),
            "too many rejected moves, passing instead"
        );
        Move::Pass
    }

    /// Checks a move against the hand, the player's restriction and the pile.
    pub fn validate(&self, seat: Seat, submitted: &Move) -> Result<(), MoveError> {
        let Move::Play { indexes, .. } = submitted else {
            return Ok(());
        };
        let player = &self.players[seat.index()];
        player.hand().check_indexes(indexes)?;
        let cards: Vec<Card> = indexes
            .iter()
            .filter_map(|&index| player.hand().get(index))
            .collect();

        if (player.status() != Status::Clear || player.is_restricted()) && cards.len() > 1 {
            return Err(MoveError::SingleCardOnly);
        }
        if let Some(card) = cards.iter().find(|card| !player.may_play(card.rank)) {
            return Err(MoveError::RankNotAllowed(card.rank));
        }
        if !self.pile.is_valid_combo(&cards) {
            return Err(MoveError::IllegalCombo);
        }
        Ok(())
    }

    fn resolve_pass(&mut self, seat: Seat, controllers: &mut [Box<dyn Controller>]) -> bool {
        let status = self.players[seat.index()].status();
        if !matches!(status, Status::Clear | Status::ForcedRank) {
            // Passing under a draw or block status means taking it.
            self.emit(controllers, GameEvent::Passed { seat, drew: false });
            return false;
        }

        let card = match self.deck.draw(&mut self.pile) {
            Ok(card) => card,
            Err(error) => {
                event!(
                    target: "makao_core::engine",
                    Level::WARN,
                    seat = seat.index(),
                    %error,
                    "could not draw for a pass"
                );
                self.emit(controllers, GameEvent::DeckExhausted { seat, missing: 1 });
                self.emit(controllers, GameEvent::Passed { seat, drew: false });
                return false;
            }
        };
        self.players[seat.index()].add_card(card);
        self.emit(controllers, GameEvent::Passed { seat, drew: true });

        let view = self.view(seat);
        if !view.is_playable(card) {
            return false;
        }
        let decision = controllers[seat.index()].decide_drawn_card(&view, card);
        let DrawnCardDecision::Play { declare_last_card } = decision else {
            return false;
        };
        match self.players[seat.index()].hand().position(card) {
            Some(index) => self.resolve_play(seat, &[index], declare_last_card, controllers),
            None => false,
        }
    }

    /// Moves validated cards onto the pile and applies what they trigger.
    fn resolve_play(
        &mut self,
        seat: Seat,
        indexes: &[usize],
        declare_last_card: bool,
        controllers: &mut [Box<dyn Controller>],
    ) -> bool {
        let previous = self.previous_active(seat);
        let next = self.next_active(seat);
        let addressing = Addressing {
            previous,
            next,
            contenders: self.contenders(),
        };
        let top_before = self.pile.top();
        let status = self.players[seat.index()].status();

        let cards = match self.players[seat.index()].remove_cards(indexes) {
            Ok(cards) => cards,
            Err(error) => {
                event!(
                    target: "makao_core::engine",
                    Level::ERROR,
                    seat = seat.index(),
                    %error,
                    "validated move no longer matches the hand"
                );
                return false;
            }
        };
        if declare_last_card {
            self.players[seat.index()].declare_last_card();
        }

        match status {
            Status::PendingDrawFive => {
                if let Some(&answer) = cards.first() {
                    self.answer_king(seat, answer, top_before, &addressing, controllers);
                }
            }
            Status::PendingDraw | Status::Blocked => {
                transfer_effect(&mut self.players, seat, next);
                self.emit(
                    controllers,
                    GameEvent::EffectTransferred {
                        from: seat,
                        to: next,
                        status,
                    },
                );
            }
            Status::Clear | Status::ForcedRank => {}
        }

        let effects = self.pile.add_cards_on_top(&cards, &addressing);
        let cards_left = self.players[seat.index()].hand().len();
        self.emit(
            controllers,
            GameEvent::Played {
                seat,
                cards,
                cards_left,
            },
        );

        let mut played_jack = false;
        let mut sub_turn = None;
        let last = effects.len().saturating_sub(1);
        for (position, effect) in effects.into_iter().enumerate() {
            match effect {
                CardEffect::None => {}
                CardEffect::Draw { target, count } => {
                    self.players[target.index()].add_draw_debt(Status::PendingDraw, count);
                    self.announce_status(target, controllers);
                }
                CardEffect::Block { target } => {
                    self.players[target.index()].add_block();
                    self.announce_status(target, controllers);
                }
                CardEffect::KingOfHearts { target } => {
                    self.players[target.index()].add_draw_debt(Status::PendingDrawFive, KING_DRAW);
                    self.announce_status(target, controllers);
                }
                CardEffect::KingOfSpades { target } => {
                    self.players[target.index()].add_draw_debt(Status::PendingDrawFive, KING_DRAW);
                    self.announce_status(target, controllers);
                    sub_turn = Some(target);
                }
                CardEffect::JackPlayed { targets } => {
                    for target in targets {
                        self.players[target.index()].set_status(Status::ForcedRank);
                    }
                    let rank = self.collect_rank(seat, controllers);
                    self.pile.force_rank(rank);
                    for player in self.players.iter_mut() {
                        player.set_allowed_ranks(vec![rank]);
                    }
                    self.emit(controllers, GameEvent::RankForced { seat, rank });
                    played_jack = true;
                }
                CardEffect::AcePlayed if position == last => {
                    let view = self.view(seat);
                    let suit = controllers[seat.index()].choose_suit(&view);
                    self.pile.force_suit(suit);
                    self.emit(controllers, GameEvent::SuitForced { seat, suit });
                }
                // A card after the Ace already consumed the suit it would force.
                CardEffect::AcePlayed => {}
            }
        }

        let remaining = self.players[seat.index()].hand().len();
        if remaining == 0 {
            self.record_win(seat, controllers);
        } else if remaining == 1 && !self.players[seat.index()].declared_last_card() {
            self.players[seat.index()].add_penalty(LAST_CARD_PENALTY);
            self.emit(controllers, GameEvent::LastCardPenalty { seat });
        }

        if let Some(target) = sub_turn {
            self.sub_turn(target, controllers);
        }
        played_jack
    }

    /// A King answering a pending five-card draw: Clubs and Diamonds cancel
    /// it, Spades and Hearts send it on. The direction follows the suit of
    /// the card that was on top before the answer.
    fn answer_king(
        &mut self,
        seat: Seat,
        card: Card,
        top_before: Card,
        addressing: &Addressing,
        controllers: &mut [Box<dyn Controller>],
    ) {
        if matches!(card.suit, Suit::Clubs | Suit::Diamonds) {
            self.players[seat.index()].clear_status();
            self.emit(controllers, GameEvent::EffectNegated { seat });
            return;
        }
        let target = if top_before.suit == Suit::Spades {
            addressing.next
        } else {
            addressing.previous
        };
        transfer_effect(&mut self.players, seat, target);
        self.emit(
            controllers,
            GameEvent::EffectTransferred {
                from: seat,
                to: target,
                status: Status::PendingDrawFive,
            },
        );
    }

    /// Immediate out-of-order turn for the target of a King of Spades.
    fn sub_turn(&mut self, seat: Seat, controllers: &mut [Box<dyn Controller>]) {
        let span =
            tracing::debug_span!(target: "makao_core::engine", "sub_turn", seat = seat.index());
        let _entered = span.enter();

        self.emit(controllers, GameEvent::SubTurn { seat });
        self.take_turn(seat, controllers);
        self.settle_draws(seat, controllers);
    }

    fn collect_rank(&mut self, seat: Seat, controllers: &mut [Box<dyn Controller>]) -> Rank {
        let controller = &mut controllers[seat.index()];
        for _ in 0..self.config.max_invalid_attempts.max(1) {
            let view = self.view(seat);
            let rank = controller.choose_rank(&view);
            if !self.config.enforce_jack_range || is_forceable(rank) {
                return rank;
            }
            controller.reject(&view, &MoveError::RankOutsideJackRange(rank));
        }
        Rank::Five
    }

    fn announce_status(&mut self, seat: Seat, controllers: &mut [Box<dyn Controller>]) {
        let player = &self.players[seat.index()];
        let granted = GameEvent::StatusGranted {
            seat,
            status: player.status(),
            draw_debt: player.draw_debt(),
            block_turns_left: player.block_turns_left(),
        };
        self.emit(controllers, granted);
    }

    /// Serves a block turn, pays draw debt and settles Jack compliance.
    fn close_turn(
        &mut self,
        seat: Seat,
        played_jack: bool,
        controllers: &mut [Box<dyn Controller>],
    ) {
        if self.players[seat.index()].block_turns_left() > 0 {
            let turns_left = self.players[seat.index()].serve_block_turn();
            self.emit(controllers, GameEvent::BlockServed { seat, turns_left });
        }

        self.settle_draws(seat, controllers);

        if self.players[seat.index()].status() == Status::ForcedRank && !played_jack {
            self.players[seat.index()].clear_status();
            self.check_forced_rank_release(controllers);
        }
    }

    fn settle_draws(&mut self, seat: Seat, controllers: &mut [Box<dyn Controller>]) {
        let debt = self.players[seat.index()].draw_debt();
        if debt == 0 {
            return;
        }
        if self.players[seat.index()].has_won() {
            self.players[seat.index()].settle_draw_debt();
            return;
        }

        let mut drawn = 0;
        while drawn < debt {
            match self.deck.draw(&mut self.pile) {
                Ok(card) => {
                    self.players[seat.index()].add_card(card);
                    drawn += 1;
                }
                Err(error) => {
                    event!(
                        target: "makao_core::engine",
                        Level::WARN,
                        seat = seat.index(),
                        owed = debt,
                        drawn,
                        %error,
                        "draw debt only partly paid"
                    );
                    break;
                }
            }
        }

        let hand_size = self.players[seat.index()].hand().len();
        self.emit(
            controllers,
            GameEvent::CardsDrawn {
                seat,
                count: drawn,
                hand_size,
            },
        );
        if drawn < debt {
            self.emit(
                controllers,
                GameEvent::DeckExhausted {
                    seat,
                    missing: debt - drawn,
                },
            );
        }
        self.players[seat.index()].settle_draw_debt();
    }

    /// Lifts the forced rank once no contender still owes it.
    fn check_forced_rank_release(&mut self, controllers: &mut [Box<dyn Controller>]) {
        if self.pile.forced_rank().is_none() {
            return;
        }
        let pending = self
            .players
            .iter()
            .any(|player| !player.has_won() && player.status() == Status::ForcedRank);
        if pending {
            return;
        }

        self.pile.release_forced_rank();
        for player in self.players.iter_mut() {
            if player.status() == Status::Clear || player.has_won() {
                player.set_allowed_ranks(Vec::new());
            }
        }
        self.emit(controllers, GameEvent::ForcedRankReleased);
    }

    fn record_win(&mut self, seat: Seat, controllers: &mut [Box<dyn Controller>]) {
        self.players[seat.index()].win_game();
        if !self.winners.contains(&seat) {
            self.winners.push(seat);
            let place = self.winners.len();
            self.emit(controllers, GameEvent::Won { seat, place });
        }
        self.check_forced_rank_release(controllers);
    }

    fn emit(&mut self, controllers: &mut [Box<dyn Controller>], game_event: GameEvent) {
        event!(
            target: "makao_core::engine",
            Level::DEBUG,
            seat = game_event.seat().map(Seat::index),
            detail = ?game_event
        );
        for controller in controllers.iter_mut() {
            controller.notify(&game_event);
        }
        self.events.push(game_event);
    }
}

/// `player_name` followed by `Player1`, `Player2`, ... for each opponent.
pub fn table_names(player_name: &str, opponents: usize) -> Vec<String> {
    let mut names = vec![player_name.to_string()];
    names.extend((1..=opponents).map(|i| format!("Player{i}")));
    names
}

fn check_table_size(players: usize) -> Result<(), EngineError> {
    let opponents = players.saturating_sub(1);
    if !(MIN_OPPONENTS..=MAX_OPPONENTS).contains(&opponents) {
        return Err(EngineError::InvalidOpponentCount(opponents));
    }
    Ok(())
}

/// Ranks a Jack may force.
pub fn is_forceable(rank: Rank) -> bool {
    (Rank::Five..=Rank::Ten).contains(&rank)
}
