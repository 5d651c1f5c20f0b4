use anyhow::{bail, format_err, Result};
use solana_sdk::pubkey::Pubkey;
use token_farm::accountant::RewardAccountant;
use token_farm::states::*;

use super::entities::{staker_id, to_hex, PoolEntity, StakerEntity};
use super::logs::FarmEvent;
use super::store::{EntityStore, WriteBatch};

/// Kind under which handled event ids are recorded.
pub const PROCESSED_EVENT_KIND: &str = "ProcessedEvent";
/// Kind holding the newest fully handled transaction signature.
pub const CURSOR_KIND: &str = "Cursor";
const LAST_SIGNATURE: &str = "last_signature";

fn rejected(err: anchor_lang::error::Error) -> anyhow::Error {
    format_err!("accounting rejected event: {:?}", err)
}

/// Replays farm events into an entity store.
///
/// State transitions go through the same `RewardAccountant` the program uses,
/// at the timestamp carried by each event, so the stored entities match the
/// on-chain accounts exactly.
pub struct Indexer<S> {
    store: S,
}

impl<S: EntityStore> Indexer<S> {
    pub fn new(store: S) -> Self {
        Indexer { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Applies the `index`-th event of transaction `signature`.
    ///
    /// Returns `false` without touching the store when that event was already
    /// handled. The entity writes and the processed marker land in one commit.
    pub fn handle(&mut self, signature: &str, index: usize, event: &FarmEvent) -> Result<bool> {
        let event_id = format!("{}:{}", signature, index);
        if self.store.get(PROCESSED_EVENT_KIND, &event_id)?.is_some() {
            return Ok(false);
        }
        let mut batch = WriteBatch::new();
        match event {
            FarmEvent::PoolInitialized(e) => self.handle_pool_initialized(e, &mut batch)?,
            FarmEvent::Staked(e) => self.handle_staked(e, &mut batch)?,
            FarmEvent::Withdrawn(e) => self.handle_withdrawn(e, &mut batch)?,
            FarmEvent::RewardAdded(e) => self.handle_reward_added(e, &mut batch)?,
            FarmEvent::RewardPaid(e) => self.handle_reward_paid(e, &mut batch)?,
            FarmEvent::RewardsDurationUpdated(e) => {
                self.handle_rewards_duration_updated(e, &mut batch)?
            }
            FarmEvent::OwnershipTransferred(e) => {
                self.handle_ownership_transferred(e, &mut batch)?
            }
            FarmEvent::Recovered(e) => {
                // No accounting effect; only checks the pool is known.
                self.load_pool(&e.pool)?;
            }
        }
        batch.put(PROCESSED_EVENT_KIND, &event_id, "1".to_string());
        self.store.commit(batch)?;
        Ok(true)
    }

    /// Applies every event of one transaction, returning how many were new,
    /// then moves the cursor to `signature`.
    pub fn handle_transaction(&mut self, signature: &str, events: &[FarmEvent]) -> Result<usize> {
        let mut applied = 0;
        for (index, event) in events.iter().enumerate() {
            if self.handle(signature, index, event)? {
                applied += 1;
            }
        }
        self.store
            .set(CURSOR_KIND, LAST_SIGNATURE, signature.to_string())?;
        Ok(applied)
    }

    /// Signature of the newest transaction handled so far.
    pub fn cursor(&self) -> Result<Option<String>> {
        self.store.get(CURSOR_KIND, LAST_SIGNATURE)
    }

    fn load_pool(&self, pool: &Pubkey) -> Result<PoolEntity> {
        self.store
            .load(&to_hex(pool))?
            .ok_or_else(|| format_err!("event for unknown pool {}", pool))
    }

    fn load_staker(&self, pool: &Pubkey, user: &Pubkey) -> Result<StakerEntity> {
        self.store
            .load(&staker_id(pool, user))?
            .ok_or_else(|| format_err!("event for unknown staker {} in pool {}", user, pool))
    }

    fn handle_pool_initialized(&self, e: &PoolInitialized, batch: &mut WriteBatch) -> Result<()> {
        if self.store.load::<PoolEntity>(&to_hex(&e.pool))?.is_some() {
            bail!("pool {} initialized twice", e.pool);
        }
        let entity = PoolEntity::new(
            &e.pool,
            &e.admin,
            &e.stake_mint,
            &e.reward_mint,
            e.rewards_duration,
            e.timestamp,
        );
        batch.save(&entity)
    }

    fn handle_staked(&self, e: &Staked, batch: &mut WriteBatch) -> Result<()> {
        let mut pool_entity = self.load_pool(&e.pool)?;
        let mut pool = pool_entity.to_pool();
        let mut staker_entity = match self.store.load(&staker_id(&e.pool, &e.user))? {
            Some(staker) => staker,
            None => {
                pool.staker_count = pool
                    .staker_count
                    .checked_add(1)
                    .ok_or_else(|| format_err!("staker count overflow in pool {}", e.pool))?;
                StakerEntity::new(&e.pool, &e.user)
            }
        };
        let mut staker = staker_entity.to_staker_account();

        RewardAccountant::new(&mut pool, e.timestamp)
            .stake(&mut staker, e.amount)
            .map_err(rejected)?;

        pool_entity.apply_pool(&pool);
        staker_entity.apply_staker_account(&staker);
        batch.save(&pool_entity)?;
        batch.save(&staker_entity)
    }

    fn handle_withdrawn(&self, e: &Withdrawn, batch: &mut WriteBatch) -> Result<()> {
        let mut pool_entity = self.load_pool(&e.pool)?;
        let mut staker_entity = self.load_staker(&e.pool, &e.user)?;
        let mut pool = pool_entity.to_pool();
        let mut staker = staker_entity.to_staker_account();

        RewardAccountant::new(&mut pool, e.timestamp)
            .withdraw(&mut staker, e.amount)
            .map_err(rejected)?;

        pool_entity.apply_pool(&pool);
        staker_entity.apply_staker_account(&staker);
        batch.save(&pool_entity)?;
        batch.save(&staker_entity)
    }

    fn handle_reward_added(&self, e: &RewardAdded, batch: &mut WriteBatch) -> Result<()> {
        let mut pool_entity = self.load_pool(&e.pool)?;
        let mut pool = pool_entity.to_pool();

        // The program already enforced the reserve bound.
        RewardAccountant::new(&mut pool, e.timestamp)
            .notify_reward_amount(e.reward, u64::MAX)
            .map_err(rejected)?;
        if pool.reward_rate != e.reward_rate || pool.period_finish != e.period_finish {
            bail!(
                "mirror diverged on RewardAdded for pool {}: rate {} / finish {} vs event {} / {}",
                e.pool,
                pool.reward_rate,
                pool.period_finish,
                e.reward_rate,
                e.period_finish
            );
        }

        pool_entity.apply_pool(&pool);
        batch.save(&pool_entity)
    }

    fn handle_reward_paid(&self, e: &RewardPaid, batch: &mut WriteBatch) -> Result<()> {
        let mut pool_entity = self.load_pool(&e.pool)?;
        let mut staker_entity = self.load_staker(&e.pool, &e.user)?;
        let mut pool = pool_entity.to_pool();
        let mut staker = staker_entity.to_staker_account();

        let reward = RewardAccountant::new(&mut pool, e.timestamp)
            .get_reward(&mut staker)
            .map_err(rejected)?;
        if reward != e.reward {
            bail!(
                "mirror diverged on RewardPaid for {} in pool {}: computed {}, paid {}",
                e.user,
                e.pool,
                reward,
                e.reward
            );
        }

        pool_entity.apply_pool(&pool);
        staker_entity.apply_staker_account(&staker);
        batch.save(&pool_entity)?;
        batch.save(&staker_entity)
    }

    fn handle_rewards_duration_updated(
        &self,
        e: &RewardsDurationUpdated,
        batch: &mut WriteBatch,
    ) -> Result<()> {
        let mut pool_entity = self.load_pool(&e.pool)?;
        let mut pool = pool_entity.to_pool();
        RewardAccountant::new(&mut pool, e.timestamp)
            .set_rewards_duration(e.new_duration)
            .map_err(rejected)?;
        pool_entity.apply_pool(&pool);
        batch.save(&pool_entity)
    }

    fn handle_ownership_transferred(
        &self,
        e: &OwnershipTransferred,
        batch: &mut WriteBatch,
    ) -> Result<()> {
        let mut pool_entity = self.load_pool(&e.pool)?;
        let previous_admin = e.previous_admin.to_string();
        if previous_admin != pool_entity.admin {
            bail!(
                "mirror diverged on OwnershipTransferred for pool {}: admin {}, event previous admin {}",
                e.pool,
                pool_entity.admin,
                previous_admin
            );
        }
        pool_entity.previous_admin = previous_admin;
        pool_entity.admin = e.new_admin.to_string();
        pool_entity.ownership_transfers = pool_entity
            .ownership_transfers
            .checked_add(1)
            .ok_or_else(|| format_err!("ownership transfer count overflow in pool {}", e.pool))?;
        batch.save(&pool_entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::entities::Entity;
    use crate::indexer::store::MemoryStore;
    use token_farm::DEFAULT_REWARDS_DURATION;

    const T0: u64 = 1_700_000_000;
    const DAY: u64 = 86_400;

    /// Runs operations against real accounts and records the events the
    /// program would emit for them.
    struct Chain {
        key: Pubkey,
        pool: Pool,
        stakers: Vec<(Pubkey, StakerAccount)>,
        events: Vec<FarmEvent>,
    }

    impl Chain {
        fn new() -> Self {
            let key = Pubkey::new_unique();
            let admin = Pubkey::new_unique();
            let pool = Pool {
                admin,
                rewards_duration: DEFAULT_REWARDS_DURATION,
                last_update_time: T0,
                ..Default::default()
            };
            let events = vec![FarmEvent::PoolInitialized(PoolInitialized {
                pool: key,
                admin,
                stake_mint: Pubkey::new_unique(),
                reward_mint: Pubkey::new_unique(),
                rewards_duration: DEFAULT_REWARDS_DURATION,
                timestamp: T0,
            })];
            Chain {
                key,
                pool,
                stakers: Vec::new(),
                events,
            }
        }

        fn staker(&mut self, user: Pubkey) -> &mut StakerAccount {
            if let Some(i) = self.stakers.iter().position(|(k, _)| *k == user) {
                return &mut self.stakers[i].1;
            }
            self.pool.staker_count += 1;
            self.stakers.push((user, StakerAccount::default()));
            &mut self.stakers.last_mut().unwrap().1
        }

        fn stake(&mut self, user: Pubkey, amount: u64, now: u64) {
            let mut staker = self.staker(user).clone();
            RewardAccountant::new(&mut self.pool, now)
                .stake(&mut staker, amount)
                .unwrap();
            *self.staker(user) = staker;
            self.events.push(FarmEvent::Staked(Staked {
                pool: self.key,
                user,
                amount,
                timestamp: now,
            }));
        }

        fn withdraw(&mut self, user: Pubkey, amount: u64, now: u64) {
            let mut staker = self.staker(user).clone();
            RewardAccountant::new(&mut self.pool, now)
                .withdraw(&mut staker, amount)
                .unwrap();
            *self.staker(user) = staker;
            self.events.push(FarmEvent::Withdrawn(Withdrawn {
                pool: self.key,
                user,
                amount,
                timestamp: now,
            }));
        }

        fn notify(&mut self, reward: u64, now: u64) {
            RewardAccountant::new(&mut self.pool, now)
                .notify_reward_amount(reward, u64::MAX)
                .unwrap();
            self.events.push(FarmEvent::RewardAdded(RewardAdded {
                pool: self.key,
                reward,
                reward_rate: self.pool.reward_rate,
                period_finish: self.pool.period_finish,
                timestamp: now,
            }));
        }

        fn claim(&mut self, user: Pubkey, now: u64) -> u64 {
            let mut staker = self.staker(user).clone();
            let reward = RewardAccountant::new(&mut self.pool, now)
                .get_reward(&mut staker)
                .unwrap();
            *self.staker(user) = staker;
            self.events.push(FarmEvent::RewardPaid(RewardPaid {
                pool: self.key,
                user,
                reward,
                timestamp: now,
            }));
            reward
        }

        /// Withdraw followed by claim at the same time, as `exit` emits them.
        fn exit(&mut self, user: Pubkey, now: u64) {
            let staked = self.staker(user).staked_amount;
            self.withdraw(user, staked, now);
            self.claim(user, now);
        }
    }

    fn index(chain: &Chain) -> Indexer<MemoryStore> {
        let mut indexer = Indexer::new(MemoryStore::new());
        let applied = indexer.handle_transaction("sig", &chain.events).unwrap();
        assert_eq!(applied, chain.events.len());
        indexer
    }

    fn assert_mirrors(indexer: &Indexer<MemoryStore>, chain: &Chain) {
        let entity: PoolEntity = indexer.store().load(&to_hex(&chain.key)).unwrap().unwrap();
        assert_eq!(entity.total_staked, chain.pool.total_staked);
        assert_eq!(entity.reward_rate, chain.pool.reward_rate);
        assert_eq!(
            entity.reward_per_token_stored,
            chain.pool.reward_per_token_stored
        );
        assert_eq!(entity.last_update_time, chain.pool.last_update_time);
        assert_eq!(entity.period_finish, chain.pool.period_finish);
        assert_eq!(entity.staker_count, chain.pool.staker_count);
        assert_eq!(
            entity.total_rewards_notified,
            chain.pool.total_rewards_notified
        );
        assert_eq!(entity.total_rewards_paid, chain.pool.total_rewards_paid);

        for (user, staker) in &chain.stakers {
            let entity: StakerEntity = indexer
                .store()
                .load(&staker_id(&chain.key, user))
                .unwrap()
                .unwrap();
            assert_eq!(entity.staked_amount, staker.staked_amount);
            assert_eq!(entity.rewards, staker.rewards);
            assert_eq!(
                entity.user_reward_per_token_paid,
                staker.user_reward_per_token_paid
            );
            assert_eq!(entity.rewarded_amount, staker.total_rewards_paid);
        }
    }

    #[test]
    fn mirror_matches_direct_accounting() {
        let (alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique());
        let mut chain = Chain::new();
        chain.stake(alice, 300, T0);
        chain.notify(5_000, T0);
        chain.stake(bob, 100, T0 + DAY);
        chain.claim(alice, T0 + 2 * DAY);
        chain.withdraw(bob, 40, T0 + 3 * DAY);
        chain.notify(2_000, T0 + 4 * DAY);
        chain.claim(bob, T0 + 5 * DAY);
        chain.exit(alice, T0 + 20 * DAY);
        chain.claim(bob, T0 + 21 * DAY);

        let indexer = index(&chain);
        assert_mirrors(&indexer, &chain);
        assert_eq!(indexer.store().count(StakerEntity::KIND), 2);
    }

    #[test]
    fn duplicate_events_are_ignored() {
        let user = Pubkey::new_unique();
        let mut chain = Chain::new();
        chain.stake(user, 1_000, T0);
        chain.notify(7_000, T0);
        chain.claim(user, T0 + DAY);

        let mut indexer = index(&chain);
        assert_eq!(indexer.handle_transaction("sig", &chain.events).unwrap(), 0);
        assert!(!indexer.handle("sig", 1, &chain.events[1]).unwrap());
        assert_mirrors(&indexer, &chain);
    }

    #[test]
    fn divergent_payout_is_rejected() {
        let user = Pubkey::new_unique();
        let mut chain = Chain::new();
        chain.stake(user, 1_000, T0);
        chain.notify(7_000, T0);
        let mut indexer = index(&chain);

        let forged = FarmEvent::RewardPaid(RewardPaid {
            pool: chain.key,
            user,
            reward: 1_000_000,
            timestamp: T0 + DAY,
        });
        assert!(indexer.handle("forged", 0, &forged).is_err());
        assert!(indexer
            .store()
            .get(PROCESSED_EVENT_KIND, "forged:0")
            .unwrap()
            .is_none());
        assert_mirrors(&indexer, &chain);
    }

    #[test]
    fn zero_claims_keep_the_mirror_in_step() {
        let user = Pubkey::new_unique();
        let mut chain = Chain::new();
        chain.stake(user, 3, T0);
        chain.notify(10, T0);
        for day in 1..7 {
            chain.claim(user, T0 + day * DAY);
        }
        let indexer = index(&chain);
        assert_mirrors(&indexer, &chain);
    }

    #[test]
    fn events_for_unknown_pools_fail() {
        let mut indexer = Indexer::new(MemoryStore::new());
        let event = FarmEvent::Staked(Staked {
            pool: Pubkey::new_unique(),
            user: Pubkey::new_unique(),
            amount: 1,
            timestamp: T0,
        });
        assert!(indexer.handle("sig", 0, &event).is_err());
    }

    #[test]
    fn admin_and_duration_updates_are_recorded() {
        let mut chain = Chain::new();
        let new_admin = Pubkey::new_unique();
        chain
            .events
            .push(FarmEvent::OwnershipTransferred(OwnershipTransferred {
                pool: chain.key,
                previous_admin: chain.pool.admin,
                new_admin,
            }));
        chain
            .events
            .push(FarmEvent::RewardsDurationUpdated(RewardsDurationUpdated {
                pool: chain.key,
                new_duration: 30 * DAY,
                timestamp: T0 + DAY,
            }));

        let indexer = index(&chain);
        let entity: PoolEntity = indexer.store().load(&to_hex(&chain.key)).unwrap().unwrap();
        assert_eq!(entity.admin, new_admin.to_string());
        assert_eq!(entity.previous_admin, chain.pool.admin.to_string());
        assert_eq!(entity.ownership_transfers, 1);
        assert_eq!(entity.rewards_duration, 30 * DAY);
    }

    #[test]
    fn transfer_from_a_stale_admin_is_rejected() {
        let chain = Chain::new();
        let mut indexer = index(&chain);
        let before: PoolEntity = indexer.store().load(&to_hex(&chain.key)).unwrap().unwrap();

        let stale = FarmEvent::OwnershipTransferred(OwnershipTransferred {
            pool: chain.key,
            previous_admin: Pubkey::new_unique(),
            new_admin: Pubkey::new_unique(),
        });
        assert!(indexer.handle("stale", 0, &stale).is_err());

        let after: PoolEntity = indexer.store().load(&to_hex(&chain.key)).unwrap().unwrap();
        assert_eq!(after, before);
        assert!(indexer
            .store()
            .get(PROCESSED_EVENT_KIND, "stale:0")
            .unwrap()
            .is_none());
    }

    /// Memory store whose `nth` commit (counting from 1) fails.
    struct FlakyStore {
        inner: MemoryStore,
        commits: usize,
        nth: usize,
    }

    impl EntityStore for FlakyStore {
        fn get(&self, kind: &str, id: &str) -> Result<Option<String>> {
            self.inner.get(kind, id)
        }

        fn commit(&mut self, batch: WriteBatch) -> Result<()> {
            self.commits += 1;
            if self.commits == self.nth {
                bail!("disk full");
            }
            self.inner.commit(batch)
        }
    }

    #[test]
    fn failed_commit_is_replayed_exactly_once() {
        let user = Pubkey::new_unique();
        let mut chain = Chain::new();
        chain.stake(user, 100, T0);

        let mut indexer = Indexer::new(FlakyStore {
            inner: MemoryStore::new(),
            commits: 0,
            nth: 2,
        });
        assert!(indexer.handle("sig", 0, &chain.events[0]).unwrap());
        assert!(indexer.handle("sig", 1, &chain.events[1]).is_err());
        assert!(indexer.handle("sig", 1, &chain.events[1]).unwrap());
        assert!(!indexer.handle("sig", 1, &chain.events[1]).unwrap());

        let store = indexer.into_store().inner;
        let pool: PoolEntity = store.load(&to_hex(&chain.key)).unwrap().unwrap();
        let staker: StakerEntity = store.load(&staker_id(&chain.key, &user)).unwrap().unwrap();
        assert_eq!(pool.total_staked, 100);
        assert_eq!(pool.staker_count, 1);
        assert_eq!(staker.staked_amount, 100);
        assert_eq!(store.count(StakerEntity::KIND), 1);
    }

    #[test]
    fn cursor_follows_the_last_transaction() {
        let user = Pubkey::new_unique();
        let mut chain = Chain::new();
        chain.stake(user, 10, T0);

        let mut indexer = Indexer::new(MemoryStore::new());
        assert_eq!(indexer.cursor().unwrap(), None);
        indexer.handle_transaction("first", &chain.events[..1]).unwrap();
        assert_eq!(indexer.cursor().unwrap().as_deref(), Some("first"));
        indexer.handle_transaction("second", &chain.events[1..]).unwrap();
        indexer.handle_transaction("empty", &[]).unwrap();
        assert_eq!(indexer.cursor().unwrap().as_deref(), Some("empty"));
    }
}
