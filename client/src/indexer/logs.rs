use anchor_lang::{AnchorDeserialize, Discriminator};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use solana_sdk::pubkey::Pubkey;
use token_farm::states::*;

const PROGRAM_LOG_DATA: &str = "Program data: ";

#[derive(Debug)]
pub enum FarmEvent {
    PoolInitialized(PoolInitialized),
    Staked(Staked),
    Withdrawn(Withdrawn),
    RewardAdded(RewardAdded),
    RewardPaid(RewardPaid),
    RewardsDurationUpdated(RewardsDurationUpdated),
    OwnershipTransferred(OwnershipTransferred),
    Recovered(Recovered),
}

fn decode<T: AnchorDeserialize + Discriminator>(bytes: &[u8]) -> Option<T> {
    let data = bytes.strip_prefix(T::DISCRIMINATOR)?;
    T::try_from_slice(data).ok()
}

impl FarmEvent {
    /// Decodes discriminator-prefixed event bytes.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        decode(bytes)
            .map(FarmEvent::PoolInitialized)
            .or_else(|| decode(bytes).map(FarmEvent::Staked))
            .or_else(|| decode(bytes).map(FarmEvent::Withdrawn))
            .or_else(|| decode(bytes).map(FarmEvent::RewardAdded))
            .or_else(|| decode(bytes).map(FarmEvent::RewardPaid))
            .or_else(|| decode(bytes).map(FarmEvent::RewardsDurationUpdated))
            .or_else(|| decode(bytes).map(FarmEvent::OwnershipTransferred))
            .or_else(|| decode(bytes).map(FarmEvent::Recovered))
    }

    pub fn pool(&self) -> Pubkey {
        match self {
            FarmEvent::PoolInitialized(e) => e.pool,
            FarmEvent::Staked(e) => e.pool,
            FarmEvent::Withdrawn(e) => e.pool,
            FarmEvent::RewardAdded(e) => e.pool,
            FarmEvent::RewardPaid(e) => e.pool,
            FarmEvent::RewardsDurationUpdated(e) => e.pool,
            FarmEvent::OwnershipTransferred(e) => e.pool,
            FarmEvent::Recovered(e) => e.pool,
        }
    }
}

/// Extracts the events `program_id` emitted, in emission order, from a
/// transaction's log messages. Data lines of other programs, including
/// programs invoked by this one, are ignored.
pub fn parse_logs(program_id: &Pubkey, logs: &[String]) -> Vec<FarmEvent> {
    let program = program_id.to_string();
    let mut stack: Vec<&str> = Vec::new();
    let mut events = Vec::new();

    for log in logs {
        if let Some(data) = log.strip_prefix(PROGRAM_LOG_DATA) {
            if stack.last() != Some(&program.as_str()) {
                continue;
            }
            if let Some(event) = STANDARD.decode(data).ok().and_then(|b| FarmEvent::decode(&b)) {
                events.push(event);
            }
            continue;
        }

        let mut words = log.split_whitespace();
        if words.next() != Some("Program") {
            continue;
        }
        match (words.next(), words.next()) {
            (Some(id), Some("invoke")) => stack.push(id),
            (Some(_), Some("success")) | (Some(_), Some("failed:")) => {
                stack.pop();
            }
            _ => {}
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::Event;

    fn data_line<T: Event>(event: &T) -> String {
        format!("{}{}", PROGRAM_LOG_DATA, STANDARD.encode(event.data()))
    }

    #[test]
    fn decodes_only_events_of_the_farm_program() {
        let farm = token_farm::ID.to_string();
        let token = "TokenkegQfeZyiNwAJbNbGNPcQMrDxRvBW6cWcYd7Ly";
        let other = Pubkey::new_unique().to_string();
        let pool = Pubkey::new_unique();
        let user = Pubkey::new_unique();

        let staked = Staked {
            pool,
            user,
            amount: 100,
            timestamp: 7,
        };
        let paid = RewardPaid {
            pool,
            user,
            reward: 0,
            timestamp: 9,
        };
        let logs = vec![
            format!("Program {} invoke [1]", farm),
            "Program log: Instruction: Stake".to_string(),
            format!("Program {} invoke [2]", token),
            data_line(&paid),
            format!("Program {} success", token),
            data_line(&staked),
            format!("Program {} success", farm),
            format!("Program {} invoke [1]", other),
            data_line(&paid),
            format!("Program {} success", other),
            format!("Program {} invoke [1]", farm),
            data_line(&paid),
            format!("Program {} consumed 4000 of 200000 compute units", farm),
            format!("Program {} success", farm),
        ];

        let events = parse_logs(&token_farm::ID, &logs);
        assert_eq!(events.len(), 2);
        match &events[0] {
            FarmEvent::Staked(e) => {
                assert_eq!(e.amount, 100);
                assert_eq!(e.timestamp, 7);
            }
            unexpected => panic!("unexpected event {unexpected:?}"),
        }
        match &events[1] {
            FarmEvent::RewardPaid(e) => assert_eq!(e.timestamp, 9),
            unexpected => panic!("unexpected event {unexpected:?}"),
        }
    }

    #[test]
    fn ignores_undecodable_data() {
        let farm = token_farm::ID.to_string();
        let logs = vec![
            format!("Program {} invoke [1]", farm),
            format!("{}not base64!", PROGRAM_LOG_DATA),
            format!("{}{}", PROGRAM_LOG_DATA, STANDARD.encode([1u8; 24])),
            format!("Program {} success", farm),
        ];
        assert!(parse_logs(&token_farm::ID, &logs).is_empty());
    }
}
