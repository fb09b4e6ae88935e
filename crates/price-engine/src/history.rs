use market_types::Gold;

/// One compounding step: `price + price * percent / 100`.
///
/// Division truncates toward zero and the result is clamped at zero, so a
/// company that crashes by 100% or more stays worthless.
#[inline]
pub fn apply_percent(price: Gold, percent: i64) -> Gold {
    let delta = price.saturating_mul(percent) / 100;
    price.saturating_add(delta).max(0)
}

/// Initial price followed by one entry per event, in event order.
pub fn price_history<I>(initial_price: Gold, percents: I) -> Vec<Gold>
where
    I: IntoIterator<Item = i64>,
{
    let percents = percents.into_iter();
    let mut history = Vec::with_capacity(1 + percents.size_hint().0);
    history.push(initial_price);

    let mut price = initial_price;
    for percent in percents {
        price = apply_percent(price, percent);
        history.push(price);
    }

    history
}

#[inline]
pub fn current_price<I>(initial_price: Gold, percents: I) -> Gold
where
    I: IntoIterator<Item = i64>,
{
    percents.into_iter().fold(initial_price, apply_percent)
}
