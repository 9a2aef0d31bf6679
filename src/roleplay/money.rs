/// Balance arithmetic for the three character accounts.
use super::errors::{RoleplayError, RoleplayResult};
use super::types::{Account, CharacterRecord};

fn ensure_positive(amount: i64) -> RoleplayResult<()> {
    if amount <= 0 {
        return Err(RoleplayError::InvalidArgument(format!(
            "amount must be positive (got {})",
            amount
        )));
    }
    Ok(())
}

/// Credit an account. There is no upper bound.
pub fn deposit(record: &mut CharacterRecord, account: Account, amount: i64) -> RoleplayResult<i64> {
    ensure_positive(amount)?;
    let balance = record.balance_mut(account);
    *balance = balance.checked_add(amount).ok_or_else(|| {
        RoleplayError::InvalidArgument(format!("{} balance would overflow", account))
    })?;
    Ok(*balance)
}

/// Debit an account. Fails without touching the balance when it is smaller than `amount`.
pub fn withdraw(record: &mut CharacterRecord, account: Account, amount: i64) -> RoleplayResult<i64> {
    ensure_positive(amount)?;
    let balance = record.balance_mut(account);
    if *balance < amount {
        return Err(RoleplayError::InsufficientFunds {
            account: account.as_str(),
            balance: *balance,
            requested: amount,
        });
    }
    *balance -= amount;
    Ok(*balance)
}

pub fn has_enough(record: &CharacterRecord, account: Account, amount: i64) -> bool {
    record.balance(account) >= amount
}

/// `$1,250` style rendering used in notifications.
pub fn format_money(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
