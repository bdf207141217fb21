//! The weekly cycle engine.
//!
//! One `GameEngine` owns one game. `advance_week` runs the eight strictly
//! ordered sub-steps of a simulated week; the ordering matters because later
//! steps read mutations from earlier ones within the same week:
//!
//! 1. shipment arrival + backlog clearing
//! 2. production completion (Factory) + backlog clearing
//! 3. order fulfillment against this week's incoming orders
//! 4. ordering decisions (demand passthrough, human input, or autoplay)
//! 5. factory production decision (bounded, 1-week lead)
//! 6. pipeline advancement
//! 7. cost accrual (strictly additive)
//! 8. immutable history snapshot + next-week seeding
//!
//! The engine is authoritative. Ledger mirroring, when attached, runs after
//! each local commit and its failures never propagate to the caller.
//! A week that cannot start (required orders missing, game not active)
//! fails fast with no side effects.

use crate::demand::{build_schedule, DemandError, DemandPattern};
use crate::engine::costs::{CostAccumulator, CostRates};
use crate::ledger::client::{LedgerAction, LedgerClient, LedgerEvent};
use crate::ledger::reconcile::{self, ReconcilePolicy, ReconcileReport};
use crate::ledger::sync::LedgerSync;
use crate::models::event::{Event, EventLog, NotificationSink};
use crate::models::game::{Game, GameStatus, RosterError};
use crate::models::order::{Order, OrderBook, OrderError};
use crate::models::pipeline::{Pipeline, PipelineError};
use crate::models::role::{OrderParty, Role, RoleMap};
use crate::models::week::{
    all_actions_complete, incomplete_roles, PendingAction, RoleWeekRecord, WeekState,
};
use crate::policy::{blend_observation, BaseStockPolicy, OrderPolicy, Visibility};
use crate::rng::SeededRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weeks between queueing a production run and its completion.
pub const PRODUCTION_LEAD_WEEKS: usize = 1;

/// Roles whose weekly order is a decision (human or agent) rather than a
/// fixed rule. The Retailer passes the customer signal through and the
/// Factory produces instead of ordering.
pub const DECISION_ROLES: [Role; 2] = [Role::Wholesaler, Role::Distributor];

// ============================================================================
// Configuration
// ============================================================================

/// Who decides a role's weekly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    /// A participant must submit the quantity before the week can advance.
    Human,
    /// The autoplay policy decides.
    Agent,
}

/// Controller assignment for the two decision roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub wholesaler: Controller,
    pub distributor: Controller,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            wholesaler: Controller::Agent,
            distributor: Controller::Agent,
        }
    }
}

/// Autoplay policy and what it is allowed to observe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoplayConfig {
    pub policy: BaseStockPolicy,
    pub visibility: Visibility,
}

/// Full game configuration, fixed at engine construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Weeks between placing an order and the supplier seeing it.
    pub order_delay: u32,
    /// Weeks goods spend in transit between adjacent tiers.
    pub shipping_delay: u32,
    pub initial_inventory: u32,
    pub max_weeks: u32,
    pub demand: DemandPattern,
    pub rng_seed: u64,
    pub cost_rates: CostRates,
    pub ledger_enabled: bool,
    pub controllers: ControllerConfig,
    pub autoplay: AutoplayConfig,
    /// Cap on a single factory production run.
    pub max_production_run: u32,
    /// Factory inventory at or above this suppresses new production.
    pub inventory_ceiling: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            order_delay: 2,
            shipping_delay: 2,
            initial_inventory: 12,
            max_weeks: 26,
            demand: DemandPattern::default(),
            rng_seed: 42,
            cost_rates: CostRates::default(),
            ledger_enabled: false,
            controllers: ControllerConfig::default(),
            autoplay: AutoplayConfig::default(),
            max_production_run: 50,
            inventory_ceiling: 60,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.max_weeks == 0 {
            return Err(GameError::InvalidConfig(
                "max_weeks must be at least 1".to_string(),
            ));
        }
        self.demand.validate()?;
        Ok(())
    }
}

// ============================================================================
// Errors and reports
// ============================================================================

/// Errors surfaced by engine operations.
///
/// Validation and precondition failures mutate nothing and are safe to
/// retry once their cause is resolved.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("game is not in setup")]
    NotInSetup,

    #[error("game is not active")]
    NotActive,

    #[error("no participant assigned for human-controlled role {0}")]
    MissingParticipant(Role),

    #[error("role {0} has no pending action this week")]
    NoActionRequired(Role),

    #[error("role {0} already submitted an order this week")]
    ActionAlreadyCompleted(Role),

    #[error("cannot advance week {week}: awaiting orders from {roles:?}")]
    ActionsIncomplete { week: u32, roles: Vec<Role> },

    #[error("ledger mirroring is disabled for this game")]
    LedgerDisabled,

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Demand(#[from] DemandError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Summary returned by a successful `advance_week`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    pub week: u32,
    pub customer_demand: u32,
    pub total_cost: f64,
    pub completed: bool,
    pub roles: RoleMap<RoleWeekRecord>,
}

// ============================================================================
// Engine
// ============================================================================

/// Authoritative simulation state for one game.
///
/// One engine per game; `&mut self` on `advance_week` serializes weeks by
/// ownership. Separate games are independent values.
pub struct GameEngine {
    pub(crate) game: Game,
    pub(crate) config: GameConfig,
    pub(crate) demand_schedule: Vec<u32>,
    pub(crate) rng: SeededRng,
    pub(crate) roles: RoleMap<RoleWeekRecord>,
    pub(crate) order_pipes: RoleMap<Pipeline>,
    pub(crate) shipment_pipes: RoleMap<Pipeline>,
    pub(crate) production_pipe: Pipeline,
    pub(crate) orders: OrderBook,
    pub(crate) costs: RoleMap<CostAccumulator>,
    pub(crate) history: Vec<WeekState>,
    pub(crate) pending: Vec<PendingAction>,
    pub(crate) event_log: EventLog,
    pub(crate) sink: Option<Box<dyn NotificationSink>>,
    pub(crate) ledger: Option<LedgerSync>,
    pub(crate) reconcile_in_progress: bool,
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("game", &self.game)
            .field("history_weeks", &self.history.len())
            .field("orders", &self.orders.len())
            .finish_non_exhaustive()
    }
}

impl GameEngine {
    /// Create an engine for a fresh game in `Setup`.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = SeededRng::new(config.rng_seed);
        let demand_schedule = build_schedule(config.demand, config.max_weeks, &mut rng)?;

        let order_delay = config.order_delay as usize;
        let shipping_delay = config.shipping_delay as usize;

        Ok(Self {
            game: Game::new(),
            demand_schedule,
            rng,
            roles: RoleMap::default(),
            order_pipes: RoleMap::new(|_| Pipeline::new(order_delay)),
            shipment_pipes: RoleMap::new(|_| Pipeline::new(shipping_delay)),
            production_pipe: Pipeline::new(PRODUCTION_LEAD_WEEKS),
            orders: OrderBook::new(),
            costs: RoleMap::default(),
            history: Vec::new(),
            pending: Vec::new(),
            event_log: EventLog::new(),
            sink: None,
            ledger: None,
            reconcile_in_progress: false,
            config,
        })
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Assign a participant to a role. Only valid during setup.
    pub fn assign_role(&mut self, participant: &str, role: Role) -> Result<(), GameError> {
        if self.game.status != GameStatus::Setup {
            return Err(GameError::NotInSetup);
        }
        self.game.roster.assign(participant, role)?;
        Ok(())
    }

    /// Attach the ledger mirror. Requires `ledger_enabled` in the config.
    ///
    /// Registration happens immediately; its failure is logged, not raised,
    /// and the reconciliation pass will surface persistent unavailability.
    pub fn attach_ledger(&mut self, client: Box<dyn LedgerClient>) -> Result<(), GameError> {
        if !self.config.ledger_enabled {
            return Err(GameError::LedgerDisabled);
        }
        let mut sync = LedgerSync::new(client);
        let current_week = self.game.current_week;
        let event = sync.register_game(&mut self.game, current_week);
        self.ledger = Some(sync);
        self.log(event);
        Ok(())
    }

    /// Attach a receiver for domain events.
    pub fn set_notification_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sink = Some(sink);
    }

    /// Move the game from Setup to Active and seed week 1.
    ///
    /// Every human-controlled decision role must have a participant
    /// assigned; agent-controlled roles need none.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.game.status != GameStatus::Setup {
            return Err(GameError::NotInSetup);
        }
        for role in DECISION_ROLES {
            if self.controller_for(role) == Controller::Human
                && self.game.roster.participant_for(role).is_none()
            {
                return Err(GameError::MissingParticipant(role));
            }
        }

        let initial = self.config.initial_inventory;
        self.roles = RoleMap::new(|_| RoleWeekRecord {
            inventory: initial,
            ..RoleWeekRecord::default()
        });
        self.pending = self.build_pending();
        self.game.status = GameStatus::Active;
        Ok(())
    }

    fn controller_for(&self, role: Role) -> Controller {
        match role {
            Role::Wholesaler => self.config.controllers.wholesaler,
            Role::Distributor => self.config.controllers.distributor,
            // Retailer and Factory follow fixed rules.
            _ => Controller::Agent,
        }
    }

    fn build_pending(&self) -> Vec<PendingAction> {
        let mut actions = Vec::new();
        for role in DECISION_ROLES {
            if self.controller_for(role) == Controller::Human {
                if let Some(participant) = self.game.roster.participant_for(role) {
                    actions.push(PendingAction::place_order(participant, role));
                }
            }
        }
        actions
    }

    // ------------------------------------------------------------------
    // Weekly actions
    // ------------------------------------------------------------------

    /// Record a human participant's order quantity for this week.
    pub fn submit_order(&mut self, role: Role, quantity: u32) -> Result<(), GameError> {
        if self.game.status != GameStatus::Active {
            return Err(GameError::NotActive);
        }
        let action = self
            .pending
            .iter_mut()
            .find(|a| a.role == role)
            .ok_or(GameError::NoActionRequired(role))?;
        if action.completed {
            return Err(GameError::ActionAlreadyCompleted(role));
        }
        action.completed = true;
        action.quantity = Some(quantity);
        Ok(())
    }

    /// Simulate one week. Fails fast, with no side effects, when the game
    /// is not active or required orders are missing.
    pub fn advance_week(&mut self) -> Result<WeekReport, GameError> {
        if self.game.status != GameStatus::Active {
            return Err(GameError::NotActive);
        }
        if !all_actions_complete(&self.pending) {
            return Err(GameError::ActionsIncomplete {
                week: self.game.current_week,
                roles: incomplete_roles(&self.pending),
            });
        }

        let week = self.game.current_week;
        let demand = self
            .demand_schedule
            .get((week - 1) as usize)
            .copied()
            .unwrap_or(0);

        // Step 1: shipment arrival, then clear what backlog the new stock
        // allows, re-shipping the cleared amount downstream.
        for role in Role::ALL {
            let arrived = self.shipment_pipes[role].take_due();
            if arrived > 0 {
                let rec = &mut self.roles[role];
                rec.inventory += arrived;
                rec.shipment_received += arrived;
                self.drain_supply_line(role, arrived, week);
            }
            self.clear_backlog(role, week)?;
        }

        // Step 2: production completion (Factory only).
        let produced = self.production_pipe.take_due();
        if produced > 0 {
            self.roles[Role::Factory].inventory += produced;
            self.drain_supply_line(Role::Factory, produced, week);
            self.clear_backlog(Role::Factory, week)?;
        }

        // Shipments whose transit completed land this week.
        self.process_due_deliveries(week);

        // Step 3: order fulfillment. The Retailer's incoming order is the
        // precomputed customer demand, everyone else reads their order pipe.
        if demand > 0 {
            let order = Order::new(OrderParty::Customer, Role::Retailer, demand, week, 0)?;
            let id = self.orders.place(order);
            self.log(Event::OrderPlaced {
                week,
                order_id: id.clone(),
                sender: OrderParty::Customer,
                recipient: Role::Retailer,
                quantity: demand,
            });
            self.mirror_place_order(&id, OrderParty::Customer, Role::Retailer, demand, week);
        }
        for role in Role::ALL {
            let incoming = if role == Role::Retailer {
                demand
            } else {
                self.order_pipes[role].take_due()
            };
            self.fulfill_incoming(role, incoming, week)?;
        }

        // Step 4: ordering decisions, downstream first so a zero order
        // delay cascades within the same cycle.
        let retailer_order = demand;
        self.place_decision(Role::Retailer, retailer_order, week)?;
        for role in DECISION_ROLES {
            let quantity = match self.controller_for(role) {
                Controller::Human => self
                    .pending
                    .iter()
                    .find(|a| a.role == role)
                    .and_then(|a| a.quantity)
                    .unwrap_or(0),
                Controller::Agent => self.autoplay_quantity(role, demand),
            };
            self.place_decision(role, quantity, week)?;
        }

        // Step 5: factory production decision, bounded both per run and by
        // an inventory ceiling to avoid runaway output.
        let factory = &self.roles[Role::Factory];
        let desired = factory.backlog + factory.incoming_order;
        let run = if factory.inventory >= self.config.inventory_ceiling {
            0
        } else {
            desired.min(self.config.max_production_run)
        };
        self.roles[Role::Factory].outgoing_order = run;
        if run > 0 {
            self.production_pipe.place(run, PRODUCTION_LEAD_WEEKS)?;
            self.roles[Role::Factory].supply_line += run;
        }

        // Step 6: advance every pipeline. Everything due this week was
        // drained in steps 1-3, so a non-empty departing bucket here means
        // units would vanish.
        for role in Role::ALL {
            let lost = self.order_pipes[role].advance() + self.shipment_pipes[role].advance();
            if lost > 0 {
                debug_assert!(false, "pipeline drained late for {}", role);
                self.log(Event::InvariantClamped {
                    week,
                    role,
                    detail: format!("{} undrained units discarded at advance", lost),
                });
            }
        }
        let lost = self.production_pipe.advance();
        if lost > 0 {
            debug_assert!(false, "production pipeline drained late");
            self.log(Event::InvariantClamped {
                week,
                role: Role::Factory,
                detail: format!("{} undrained production units discarded", lost),
            });
        }

        // Step 7: cost accrual on closing positions, cumulative only.
        for role in Role::ALL {
            let (inventory, backlog) = {
                let rec = &self.roles[role];
                (rec.inventory, rec.backlog)
            };
            self.costs[role].charge_week(inventory, backlog, &self.config.cost_rates);
            self.roles[role].cumulative_cost = self.costs[role].total();
        }

        // Step 8: freeze the snapshot and seed next week.
        let snapshot = WeekState {
            week,
            customer_demand: demand,
            roles: self.roles.clone(),
            actions: std::mem::take(&mut self.pending),
        };
        self.history.push(snapshot);

        let total_cost = self.total_cost();
        self.log(Event::WeekAdvanced { week, total_cost });
        self.mirror(
            LedgerAction::AdvanceWeek {
                game_id: self.game.id().to_string(),
                week,
                total_cost,
            },
            None,
        );

        let completed = week >= self.config.max_weeks;
        if completed {
            self.game.status = GameStatus::Completed;
            self.log(Event::GameCompleted { week, total_cost });
        } else {
            self.game.current_week = week + 1;
            for role in Role::ALL {
                self.roles[role] = self.roles[role].carry_forward();
            }
            self.pending = self.build_pending();
        }

        Ok(WeekReport {
            week,
            customer_demand: demand,
            total_cost,
            completed,
            roles: self
                .history
                .last()
                .map(|w| w.roles.clone())
                .unwrap_or_default(),
        })
    }

    // ------------------------------------------------------------------
    // Week sub-steps
    // ------------------------------------------------------------------

    /// Clear `min(backlog, inventory)` and re-ship it downstream.
    fn clear_backlog(&mut self, role: Role, week: u32) -> Result<(), GameError> {
        let cleared = {
            let rec = &mut self.roles[role];
            let cleared = rec.backlog.min(rec.inventory);
            rec.backlog -= cleared;
            rec.inventory -= cleared;
            cleared
        };
        self.ship_downstream(role, cleared, week)
    }

    /// Step 3's fulfillment arithmetic, also re-invoked directly for
    /// zero-order-delay placements.
    fn fulfill_incoming(&mut self, role: Role, incoming: u32, week: u32) -> Result<(), GameError> {
        if incoming == 0 {
            return Ok(());
        }
        let shipped = {
            let rec = &mut self.roles[role];
            rec.incoming_order += incoming;
            let shipped = rec.inventory.min(incoming);
            rec.inventory -= shipped;
            rec.backlog += incoming - shipped;
            shipped
        };
        self.ship_downstream(role, shipped, week)
    }

    /// Queue `amount` units toward the next tier down (or hand them to the
    /// customer for the Retailer) and advance covered orders.
    fn ship_downstream(&mut self, role: Role, amount: u32, week: u32) -> Result<(), GameError> {
        if amount == 0 {
            return Ok(());
        }
        self.roles[role].shipment_sent += amount;

        let delay = match role.downstream() {
            Some(dest) => {
                let delay = self.config.shipping_delay;
                if delay == 0 {
                    // Zero transit: land immediately instead of parking the
                    // units in a bucket the advance step would discard.
                    let rec = &mut self.roles[dest];
                    rec.inventory += amount;
                    rec.shipment_received += amount;
                    self.drain_supply_line(dest, amount, week);
                } else {
                    self.shipment_pipes[dest].place(amount, delay as usize)?;
                }
                delay
            }
            // Customer handoff is immediate.
            None => 0,
        };

        let shipped_ids = self.orders.record_shipment(role, amount, week, delay);
        for id in shipped_ids {
            let (quantity, delivered, order_ref) = match self.orders.get(&id) {
                Some(o) => (
                    o.quantity(),
                    o.is_delivered(),
                    o.ledger
                        .external_id
                        .clone()
                        .unwrap_or_else(|| id.clone()),
                ),
                None => continue,
            };
            self.log(Event::OrderShipped {
                week,
                order_id: id.clone(),
                quantity,
            });
            self.mirror(
                LedgerAction::ShipOrder {
                    game_id: self.game.id().to_string(),
                    week,
                    order_ref: order_ref.clone(),
                    quantity,
                },
                Some(&id),
            );
            if delivered {
                self.log(Event::OrderDelivered {
                    week,
                    order_id: id.clone(),
                });
                self.mirror(
                    LedgerAction::DeliverOrder {
                        game_id: self.game.id().to_string(),
                        week,
                        order_ref,
                    },
                    Some(&id),
                );
            }
        }
        Ok(())
    }

    /// Mark shipments whose transit completed by `week` as delivered.
    fn process_due_deliveries(&mut self, week: u32) {
        let delivered = self.orders.process_deliveries(week);
        for id in delivered {
            let order_ref = self
                .orders
                .get(&id)
                .and_then(|o| o.ledger.external_id.clone())
                .unwrap_or_else(|| id.clone());
            self.log(Event::OrderDelivered {
                week,
                order_id: id.clone(),
            });
            self.mirror(
                LedgerAction::DeliverOrder {
                    game_id: self.game.id().to_string(),
                    week,
                    order_ref,
                },
                Some(&id),
            );
        }
    }

    /// Place a role's weekly upstream order (step 4). A zero quantity is a
    /// valid decision and places nothing.
    fn place_decision(&mut self, role: Role, quantity: u32, week: u32) -> Result<(), GameError> {
        self.roles[role].outgoing_order = quantity;
        let Some(supplier) = role.upstream() else {
            return Ok(());
        };
        if quantity == 0 {
            return Ok(());
        }

        let order = Order::new(
            OrderParty::Role(role),
            supplier,
            quantity,
            week,
            self.config.order_delay,
        )?;
        let id = self.orders.place(order);
        self.roles[role].supply_line += quantity;
        self.log(Event::OrderPlaced {
            week,
            order_id: id.clone(),
            sender: OrderParty::Role(role),
            recipient: supplier,
            quantity,
        });
        self.mirror_place_order(&id, OrderParty::Role(role), supplier, quantity, week);

        if self.config.order_delay == 0 {
            // The supplier sees and (partially) fulfills the order within
            // this same cycle.
            self.fulfill_incoming(supplier, quantity, week)?;
        } else {
            self.order_pipes[supplier].place(quantity, self.config.order_delay as usize)?;
        }
        Ok(())
    }

    /// Compute an agent role's order via the configured policy.
    fn autoplay_quantity(&self, role: Role, current_demand: u32) -> u32 {
        let observed = self.observed_series(role, current_demand);
        let rec = &self.roles[role];
        let inputs = crate::policy::PolicyInputs {
            inventory: rec.inventory,
            backlog: rec.backlog,
            supply_line: rec.supply_line,
            observed_demand: &observed,
        };
        self.config.autoplay.policy.order_quantity(&inputs)
    }

    /// The demand series a role's forecast may observe, oldest first,
    /// including the current week.
    fn observed_series(&self, role: Role, current_demand: u32) -> Vec<u32> {
        let visibility = self.config.autoplay.visibility;
        let observe = |own: u32, customer: u32| match visibility {
            Visibility::Traditional => own,
            Visibility::DemandSharing => blend_observation(own, customer),
        };
        let mut series: Vec<u32> = self
            .history
            .iter()
            .map(|w| observe(w.record(role).incoming_order, w.customer_demand))
            .collect();
        series.push(observe(self.roles[role].incoming_order, current_demand));
        series
    }

    fn drain_supply_line(&mut self, role: Role, arrived: u32, week: u32) {
        let rec = &mut self.roles[role];
        if arrived > rec.supply_line {
            debug_assert!(false, "supply line underflow for {}", role);
            rec.supply_line = 0;
            self.log(Event::InvariantClamped {
                week,
                role,
                detail: "supply line underflow clamped to zero".to_string(),
            });
        } else {
            rec.supply_line -= arrived;
        }
    }

    // ------------------------------------------------------------------
    // Ledger integration
    // ------------------------------------------------------------------

    fn mirror(&mut self, action: LedgerAction, order_id: Option<&str>) {
        let week = self.game.current_week;
        let event = match self.ledger.as_mut() {
            Some(sync) => sync.submit(action, order_id, &mut self.orders, week),
            None => return,
        };
        self.log(event);
    }

    fn mirror_place_order(
        &mut self,
        order_id: &str,
        sender: OrderParty,
        recipient: Role,
        quantity: u32,
        week: u32,
    ) {
        self.mirror(
            LedgerAction::PlaceOrder {
                game_id: self.game.id().to_string(),
                week,
                sender,
                recipient,
                quantity,
                correlation_id: order_id.to_string(),
            },
            Some(order_id),
        );
    }

    /// Apply an inbound ledger confirmation. Idempotent; duplicates and
    /// out-of-order arrivals are no-ops on already-advanced orders.
    pub fn apply_ledger_event(&mut self, event: &LedgerEvent) -> Result<(), GameError> {
        let week = self.game.current_week;
        let events = match self.ledger.as_mut() {
            Some(sync) => sync.on_ledger_event(event, &mut self.orders, week),
            None => return Err(GameError::LedgerDisabled),
        };
        for e in events {
            self.log(e);
        }
        Ok(())
    }

    /// Run one reconciliation pass against the ledger.
    ///
    /// A pass already in progress yields a `skipped` report rather than an
    /// error; overlapping schedules are expected, not exceptional.
    pub fn reconcile(&mut self, policy: &ReconcilePolicy) -> Result<ReconcileReport, GameError> {
        if self.ledger.is_none() {
            return Err(GameError::LedgerDisabled);
        }
        if self.reconcile_in_progress {
            return Ok(ReconcileReport {
                skipped: true,
                ..ReconcileReport::default()
            });
        }
        self.reconcile_in_progress = true;
        let week = self.game.current_week;
        let (report, events) = match self.ledger.as_mut() {
            Some(sync) => reconcile::run_pass(sync, &self.game, &mut self.orders, week, policy),
            None => (ReconcileReport::default(), Vec::new()),
        };
        self.reconcile_in_progress = false;
        for e in events {
            self.log(e);
        }
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Observability and accessors
    // ------------------------------------------------------------------

    fn log(&mut self, event: Event) {
        if let Some(sink) = self.sink.as_mut() {
            sink.deliver(&event);
        }
        self.event_log.push(event);
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status(&self) -> GameStatus {
        self.game.status
    }

    pub fn current_week(&self) -> u32 {
        self.game.current_week
    }

    pub fn is_completed(&self) -> bool {
        self.game.status == GameStatus::Completed
    }

    /// Immutable per-week history, oldest first.
    pub fn history(&self) -> &[WeekState] {
        &self.history
    }

    pub fn events(&self) -> &EventLog {
        &self.event_log
    }

    pub fn orders(&self) -> &OrderBook {
        &self.orders
    }

    /// This week's working record for a role.
    pub fn role_record(&self, role: Role) -> &RoleWeekRecord {
        &self.roles[role]
    }

    pub fn demand_schedule(&self) -> &[u32] {
        &self.demand_schedule
    }

    /// Required actions still outstanding this week.
    pub fn pending_actions(&self) -> &[PendingAction] {
        &self.pending
    }

    /// Chain-wide cumulative cost.
    pub fn total_cost(&self) -> f64 {
        self.costs.iter().map(|(_, c)| c.total()).sum()
    }
}
