use allocation::{AllocationEngine, Error};
use core_types::{Instrument, MarginMode, PortfolioConfiguration, RawInstrumentInput, RawSizingRequest, SizingMode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn assert_close(actual: Decimal, expected: Decimal) {
    assert!(
        (actual - expected).abs() < dec!(0.000001),
        "expected {expected}, got {actual}"
    );
}

fn template(locked: Option<Decimal>) -> PortfolioConfiguration {
    let mut oil = Instrument::new("Oil", dec!(0))
        .with_margin_rate(dec!(0.10))
        .with_base_stake(dec!(1));
    if let Some(stake) = locked {
        oil = oil.with_pinned_stake(stake);
    }
    PortfolioConfiguration::new(
        "template",
        MarginMode::Rate,
        SizingMode::BaseStakes,
        vec![
            Instrument::new("Index", dec!(0))
                .with_margin_rate(dec!(0.05))
                .with_base_stake(dec!(2)),
            Instrument::new("Bond", dec!(0))
                .with_margin_rate(dec!(0.0333))
                .with_base_stake(dec!(5)),
            oil,
        ],
    )
    .unwrap()
}

fn request(balance: &str) -> RawSizingRequest {
    RawSizingRequest {
        account_balance: balance.into(),
        margin_usage_percent: "20".into(),
        instruments: vec![
            RawInstrumentInput::new("Index", "5000"),
            RawInstrumentInput::new("Bond", "120"),
            RawInstrumentInput::new("Oil", "75"),
        ],
    }
}

#[test]
fn scenario_uniform_rescale() {
    let result = AllocationEngine::new(&template(None)).size(&request("10000")).unwrap();

    // Base margins: 2*5000*0.05 = 500, 5*120*0.0333 = 19.98, 1*75*0.10 = 7.5.
    let scale = result.scale_factor.unwrap();
    assert_close(scale, dec!(2000) / dec!(527.48));
    assert_close(result.position("Index").unwrap().stake, dec!(2) * scale);
    assert_close(result.position("Bond").unwrap().stake, dec!(5) * scale);
    assert_close(result.position("Oil").unwrap().stake, dec!(1) * scale);
    assert_close(result.total_margin, dec!(2000));
}

#[test]
fn doubling_budget_doubles_every_stake() {
    let engine_config = template(None);
    let engine = AllocationEngine::new(&engine_config);
    let single = engine.size(&request("10000")).unwrap();
    let double = engine.size(&request("20000")).unwrap();

    for (a, b) in single.positions.iter().zip(double.positions.iter()) {
        assert_eq!(a.name, b.name);
        assert_close(b.stake, a.stake * dec!(2));
        assert_close(b.margin_used, a.margin_used * dec!(2));
    }
}

#[test]
fn locked_leg_is_taken_off_the_budget() {
    let result = AllocationEngine::new(&template(Some(dec!(40)))).size(&request("10000")).unwrap();

    // Locked oil: 40 * 75 * 0.10 = 300 of margin; 1700 left for the others.
    let oil = result.position("Oil").unwrap();
    assert!(oil.pinned);
    assert_eq!(oil.stake, dec!(40));
    assert_eq!(oil.margin_used, dec!(300));

    let scale = result.scale_factor.unwrap();
    assert_close(scale, dec!(1700) / dec!(519.98));
    assert_close(result.position("Index").unwrap().stake, dec!(2) * scale);
    assert_close(result.position("Bond").unwrap().stake, dec!(5) * scale);
    assert_close(result.total_margin, dec!(2000));
}

#[test]
fn locked_leg_works_with_target_weights() {
    let config = PortfolioConfiguration::new(
        "weighted-lock",
        MarginMode::Rate,
        SizingMode::TargetWeights,
        vec![
            Instrument::new("Index", dec!(0.6)).with_margin_rate(dec!(0.05)),
            Instrument::new("Bond", dec!(0.4)).with_margin_rate(dec!(0.05)),
            Instrument::new("Oil", dec!(0.5))
                .with_margin_rate(dec!(0.10))
                .with_pinned_stake(dec!(40)),
        ],
    )
    .unwrap();
    let result = AllocationEngine::new(&config).size(&request("10000")).unwrap();

    // 2000 - 300 locked = 1700, split 60 / 40 between the free legs.
    assert_eq!(result.position("Index").unwrap().margin_used, dec!(1020));
    assert_close(result.position("Bond").unwrap().margin_used, dec!(680));
    assert_close(result.total_margin, dec!(2000));
    assert_eq!(result.scale_factor, None);
}

#[test]
fn zero_margin_template_is_degenerate() {
    let config = PortfolioConfiguration::new(
        "no-margin",
        MarginMode::MinStake,
        SizingMode::BaseStakes,
        vec![Instrument::new("Index", dec!(0))
            .with_min_stake(dec!(1), dec!(0))
            .with_base_stake(dec!(2))],
    )
    .unwrap();
    let raw = RawSizingRequest {
        account_balance: "10000".into(),
        margin_usage_percent: "20".into(),
        instruments: vec![RawInstrumentInput::new("Index", "5000")],
    };
    let err = AllocationEngine::new(&config).size(&raw).unwrap_err();
    assert_eq!(err, Error::DegenerateBaseConfiguration);
}

#[test]
fn rescaling_never_undercuts_a_minimum_stake() {
    // Per-point margins: Index 250, Gilt 30. Base margins 2*250 + 1*30 = 530.
    let config = PortfolioConfiguration::new(
        "dfb-template",
        MarginMode::MinStake,
        SizingMode::BaseStakes,
        vec![
            Instrument::new("Index", dec!(0))
                .with_min_stake(dec!(1), dec!(250))
                .with_base_stake(dec!(2)),
            Instrument::new("Gilt", dec!(0))
                .with_min_stake(dec!(0.1), dec!(3))
                .with_base_stake(dec!(1)),
        ],
    )
    .unwrap();
    let raw = RawSizingRequest {
        account_balance: "1000".into(),
        margin_usage_percent: "20".into(),
        instruments: vec![
            RawInstrumentInput::new("Index", "5000"),
            RawInstrumentInput::new("Gilt", "95"),
        ],
    };
    let result = AllocationEngine::new(&config).size(&raw).unwrap();

    // Scale 200 / 530 takes Index to 0.75 points, below its 1-point floor.
    let scale = result.scale_factor.unwrap();
    assert_close(scale, dec!(200) / dec!(530));

    let index = result.position("Index").unwrap();
    assert!(index.floor_bound);
    assert_eq!(index.stake, dec!(1));
    assert_eq!(index.margin_used, dec!(250));

    let gilt = result.position("Gilt").unwrap();
    assert!(!gilt.floor_bound);
    assert_close(gilt.stake, scale);

    assert_eq!(result.target_margin, dec!(200));
    assert!(result.total_margin > result.target_margin);
}
