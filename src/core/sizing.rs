use bon::Builder;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::{
    core::{
        Curve,
        Diagnosed,
        SizingError,
        Warning,
        period::Period,
        series::{DaySeries, Integrate},
    },
    prelude::*,
    quantity::{Quantity, energy::KilowattHours, power::Kilowatts, time::Hours},
};

pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

/// Number of steps the fixed schedule takes to get from the maximum load down to zero.
const N_FIXED_STEPS: f64 = 10_000.0;

/// How the candidate heat pump capacity goes down from one iteration to the next.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, clap::ValueEnum)]
pub enum StepSchedule {
    /// Reduce the capacity by the same step at every iteration.
    #[default]
    Fixed,

    /// Reduce the capacity by `step × i` at iteration `i`, so that the decrements accumulate.
    Accumulating,
}

impl StepSchedule {
    const ACCUMULATING_STEP: Kilowatts = Quantity(0.0005);

    fn default_step(self, hp_size_max: Kilowatts) -> Kilowatts {
        match self {
            Self::Fixed => Kilowatts::from(hp_size_max.0.abs() / N_FIXED_STEPS),
            Self::Accumulating => Self::ACCUMULATING_STEP,
        }
    }

    /// Candidate capacities, the first one being `start` itself.
    fn candidates(self, start: Kilowatts, step: Kilowatts) -> impl Iterator<Item = Kilowatts> {
        (0_u32..).scan(start, move |capacity, i| {
            let i = f64::from(i);
            *capacity = match self {
                Self::Fixed => start - step * i,
                Self::Accumulating => *capacity - step * i,
            };
            Some(*capacity)
        })
    }
}

/// What the storage has to cover during the peak period.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, clap::ValueEnum)]
pub enum PeakDemand {
    /// Integrate the load in excess of the heat pump capacity.
    #[default]
    Excess,

    /// Integrate the whole load of the minutes exceeding the heat pump capacity,
    /// as if the heat pump were switched off in them.
    Load,
}

#[derive(Copy, Clone, Debug, Builder)]
pub struct SearchOptions {
    #[builder(default)]
    pub schedule: StepSchedule,

    /// Defaults to a schedule-specific step.
    pub step: Option<Kilowatts>,

    #[builder(default)]
    pub peak_demand: PeakDemand,

    #[builder(default = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, derive_more::Constructor)]
pub struct CurvePoint {
    pub hp_capacity: Kilowatts,
    pub tes_capacity: KilowattHours,
}

pub type Segment = Vec<CurvePoint>;

/// Bottom segment of the trade-off curve, ending at the knee.
///
/// Only [`Sizer::bottom_curve`] makes one, and [`Sizer::top_curve`] needs it.
/// It remembers the walk it came from, so that the top curve follows the same candidates.
#[must_use]
#[derive(Clone, Debug)]
pub struct BottomCurve {
    segment: Segment,
    knee: CurvePoint,
    walk: Walk,
}

/// Where the candidate capacities start and how they go down.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Walk {
    start: Kilowatts,
    schedule: StepSchedule,
    step: Kilowatts,
}

impl BottomCurve {
    /// Where the storage demanded by the peak period first exceeds what the charge period supplies.
    pub const fn knee(&self) -> CurvePoint {
        self.knee
    }
}

/// Boundary of the feasible heat pump and storage capacities.
#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct TradeoffCurve {
    pub hp_size_max: Kilowatts,
    pub peak_energy: KilowattHours,

    /// Heat pump covering the maximum load on its own.
    pub point_1: CurvePoint,

    /// The knee where the bottom and top segments meet.
    pub point_2: CurvePoint,

    pub bottom: Segment,
    pub top: Segment,
    pub right: Segment,
}

#[derive(Builder)]
#[builder(finish_fn(vis = ""))]
pub struct Sizing<'a> {
    day: &'a DaySeries,
    charge_period: Period,
    discharge_period: Period,

    #[builder(default)]
    options: SearchOptions,
}

impl<S: sizing_builder::IsComplete> SizingBuilder<'_, S> {
    pub fn try_prepare(self) -> Result<Diagnosed<Sizer>, SizingError> {
        self.build().try_prepare()
    }
}

impl Sizing<'_> {
    #[instrument(
        skip_all,
        fields(charge_period = %self.charge_period, discharge_period = %self.discharge_period),
    )]
    fn try_prepare(self) -> Result<Diagnosed<Sizer>, SizingError> {
        let charge = self.charge_period.extract(self.day);
        if charge.is_empty() {
            return Err(SizingError::EmptyPeriod { period: self.charge_period });
        }
        let peak = self.discharge_period.extract(self.day);
        if peak.is_empty() {
            return Err(SizingError::EmptyPeriod { period: self.discharge_period });
        }

        let hp_size_max = self
            .day
            .iter()
            .map(|(_, load)| *load)
            .max_by_key(|load| OrderedFloat(load.0))
            .ok_or(SizingError::EmptySeries)?;
        let peak_energy = peak.iter().copied().trapezoid(Hours::ONE_MINUTE);
        let step =
            self.options.step.unwrap_or_else(|| self.options.schedule.default_step(hp_size_max));
        if !(step.0.is_finite() && step > Kilowatts::ZERO) {
            return Err(SizingError::InvalidStep { step });
        }
        if self.options.max_iterations == 0 {
            return Err(SizingError::ZeroIterations);
        }
        info!(
            %hp_size_max,
            %peak_energy,
            %step,
            n_charge_samples = charge.len(),
            n_peak_samples = peak.len(),
            "prepared the sizing",
        );

        let sizer = Diagnosed::new(Sizer {
            charge,
            peak,
            peak_energy,
            hp_size_max,
            schedule: self.options.schedule,
            step,
            peak_demand: self.options.peak_demand,
            max_iterations: self.options.max_iterations,
        });
        if self.charge_period.overlaps(self.discharge_period) {
            Ok(sizer.with_warning(Warning::OverlappingPeriods))
        } else {
            Ok(sizer)
        }
    }
}

/// Sizing engine for a single day.
#[must_use]
pub struct Sizer {
    charge: Vec<Kilowatts>,
    peak: Vec<Kilowatts>,
    peak_energy: KilowattHours,
    hp_size_max: Kilowatts,
    schedule: StepSchedule,
    step: Kilowatts,
    peak_demand: PeakDemand,
    max_iterations: usize,
}

impl Sizer {
    /// Energy consumed during the peak period.
    pub const fn peak_energy(&self) -> KilowattHours {
        self.peak_energy
    }

    /// Maximum load of the day.
    pub const fn hp_size_max(&self) -> Kilowatts {
        self.hp_size_max
    }

    pub fn point_1(&self) -> CurvePoint {
        CurvePoint::new(self.hp_size_max, KilowattHours::ZERO)
    }

    /// Storage capacity charged by the heat pump surplus during the charge period.
    ///
    /// The surplus is not clamped: minutes where the load exceeds the heat pump capacity
    /// count as negative energy, so the result goes negative for small capacities.
    pub fn tes_size(&self, hp_capacity: Kilowatts) -> KilowattHours {
        self.charge.iter().map(|load| hp_capacity - *load).riemann(Hours::ONE_MINUTE)
    }

    /// Storage capacity needed to cover the peak-period load which the heat pump cannot.
    pub fn peak_tes_demand(&self, hp_capacity: Kilowatts) -> KilowattHours {
        match self.peak_demand {
            PeakDemand::Excess => self
                .peak
                .iter()
                .map(|load| (*load - hp_capacity).max(Kilowatts::ZERO))
                .trapezoid(Hours::ONE_MINUTE),
            PeakDemand::Load => self
                .peak
                .iter()
                .copied()
                .filter(|load| *load > hp_capacity)
                .trapezoid(Hours::ONE_MINUTE),
        }
    }

    const fn walk(&self) -> Walk {
        Walk { start: self.hp_size_max, schedule: self.schedule, step: self.step }
    }

    fn candidates(&self) -> impl Iterator<Item = Kilowatts> {
        self.schedule.candidates(self.hp_size_max, self.step).take(self.max_iterations)
    }

    /// Walk down from the maximum load until the peak demand exceeds the charged storage.
    #[instrument(skip_all, fields(schedule = ?self.schedule, step = %self.step))]
    pub fn bottom_curve(&self) -> Result<BottomCurve, SizingError> {
        let mut segment = Segment::new();
        for hp_capacity in self.candidates() {
            let tes_capacity = self.peak_tes_demand(hp_capacity);
            let point = CurvePoint::new(hp_capacity, tes_capacity);
            segment.push(point);
            if tes_capacity > self.tes_size(hp_capacity) {
                info!(n_iterations = segment.len(), knee = ?point, "found the knee");
                return Ok(BottomCurve { segment, knee: point, walk: self.walk() });
            }
        }
        Err(SizingError::NotConverged { curve: Curve::Bottom, n_iterations: self.max_iterations })
    }

    /// Walk down from the maximum load to the knee, capping the charged storage at the peak energy.
    #[instrument(skip_all, fields(schedule = ?self.schedule, step = %self.step))]
    pub fn top_curve(&self, bottom: &BottomCurve) -> Result<Segment, SizingError> {
        if bottom.walk != self.walk() {
            return Err(SizingError::MismatchedBottomCurve);
        }
        let mut segment = Segment::new();
        for hp_capacity in self.candidates() {
            segment.push(CurvePoint::new(
                hp_capacity,
                self.tes_size(hp_capacity).min(self.peak_energy),
            ));
            if hp_capacity <= bottom.knee.hp_capacity {
                debug!(n_iterations = segment.len(), "reached the knee");
                return Ok(segment);
            }
        }
        Err(SizingError::NotConverged { curve: Curve::Top, n_iterations: self.max_iterations })
    }

    /// Vertical line at the maximum load, from the peak energy down to zero.
    pub fn right_segment(&self) -> Segment {
        vec![CurvePoint::new(self.hp_size_max, self.peak_energy), self.point_1()]
    }

    pub fn trade_off(&self) -> Result<TradeoffCurve, SizingError> {
        let bottom = self.bottom_curve()?;
        let top = self.top_curve(&bottom)?;
        Ok(TradeoffCurve {
            hp_size_max: self.hp_size_max(),
            peak_energy: self.peak_energy(),
            point_1: self.point_1(),
            point_2: bottom.knee(),
            bottom: bottom.segment,
            top,
            right: self.right_segment(),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{NaiveTime, Timelike};
    use itertools::Itertools;

    use super::*;

    /// Minute-resolution day with the load given by the hour and minute.
    fn day(load: impl Fn(u32, u32) -> f64) -> DaySeries {
        (0..24 * 60)
            .map(|minute| {
                let time = NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0).unwrap();
                (time, Kilowatts::from(load(time.hour(), time.minute())))
            })
            .collect()
    }

    /// Flat 10 kW with a 50 kW spike from 12:00 until 14:00.
    fn spiky_day() -> DaySeries {
        day(|hour, _| if (12..14).contains(&hour) { 50.0 } else { 10.0 })
    }

    fn prepare(day: &DaySeries, options: SearchOptions) -> Diagnosed<Sizer> {
        Sizing::builder()
            .day(day)
            .charge_period(Period::try_new(0, 6).unwrap())
            .discharge_period(Period::try_new(12, 14).unwrap())
            .options(options)
            .try_prepare()
            .unwrap()
    }

    #[test]
    fn test_spiky_day_anchors() {
        let sizer = prepare(&spiky_day(), SearchOptions::default());
        assert!(sizer.warnings.is_empty());
        let sizer = sizer.value;

        assert_abs_diff_eq!(sizer.hp_size_max().0, 50.0);

        // 120 minutes at 50 kW and the inclusive 14:00 sample at 10 kW:
        assert_abs_diff_eq!(
            sizer.peak_energy().0,
            (119.0 * 50.0 + (50.0 + 10.0) / 2.0) / 60.0,
            epsilon = 1e-9,
        );

        let right = sizer.right_segment();
        assert_eq!(
            right,
            [
                CurvePoint::new(Kilowatts::from(50.0), sizer.peak_energy()),
                CurvePoint::new(Kilowatts::from(50.0), KilowattHours::ZERO),
            ],
        );
        assert_eq!(sizer.point_1(), right[1]);
    }

    #[test]
    fn test_tes_size_goes_negative() {
        let sizer = prepare(&spiky_day(), SearchOptions::default()).value;

        // 361 charge samples at 10 kW:
        assert_abs_diff_eq!(
            sizer.tes_size(Kilowatts::from(16.0)).0,
            6.0 * 361.0 / 60.0,
            epsilon = 1e-9,
        );
        assert!(sizer.tes_size(Kilowatts::from(10.0)).0.abs() < 1e-9);
        assert!(sizer.tes_size(Kilowatts::from(5.0)) < KilowattHours::ZERO);
    }

    #[test]
    fn test_peak_tes_demand() {
        let sizer = prepare(&spiky_day(), SearchOptions::default()).value;
        assert_abs_diff_eq!(sizer.peak_tes_demand(Kilowatts::from(50.0)).0, 0.0);
        assert_abs_diff_eq!(
            sizer.peak_tes_demand(Kilowatts::from(40.0)).0,
            (119.0 * 10.0 + 10.0 / 2.0) / 60.0,
            epsilon = 1e-9,
        );

        let options = SearchOptions::builder().peak_demand(PeakDemand::Load).build();
        let sizer = prepare(&spiky_day(), options).value;
        assert_abs_diff_eq!(
            sizer.peak_tes_demand(Kilowatts::from(40.0)).0,
            119.0 * 50.0 / 60.0,
            epsilon = 1e-9,
        );
    }

    #[test]
    fn test_bottom_curve_converges() {
        let sizer = prepare(&spiky_day(), SearchOptions::default()).value;
        let bottom = sizer.bottom_curve().unwrap();
        let knee = bottom.knee();

        assert_eq!(bottom.segment.last(), Some(&knee));
        assert!(knee.tes_capacity > sizer.tes_size(knee.hp_capacity));
        for point in &bottom.segment[..bottom.segment.len() - 1] {
            assert!(point.tes_capacity <= sizer.tes_size(point.hp_capacity));
        }
        assert!(
            bottom.segment.iter().tuple_windows().all(|(lhs, rhs)| lhs.hp_capacity > rhs.hp_capacity)
        );

        // Demand of 119.5 × (50 − hp) meets supply of 361 × (hp − 10) at about 19.95 kW:
        assert!((knee.hp_capacity.0 - 9585.0 / 480.5).abs() < 0.01);
    }

    #[test]
    fn test_top_curve_stops_at_knee() {
        let sizer = prepare(&spiky_day(), SearchOptions::default()).value;
        let bottom = sizer.bottom_curve().unwrap();
        let top = sizer.top_curve(&bottom).unwrap();

        assert_eq!(top.len(), bottom.segment.len());
        assert_eq!(top.last().unwrap().hp_capacity, bottom.knee().hp_capacity);
        assert!(top.iter().all(|point| point.tes_capacity <= sizer.peak_energy()));
        assert_eq!(top[0].tes_capacity, sizer.peak_energy());
    }

    #[test]
    fn test_accumulating_schedule() {
        let candidates = StepSchedule::Accumulating
            .candidates(Kilowatts::from(50.0), StepSchedule::ACCUMULATING_STEP)
            .take(4)
            .collect_vec();
        assert_abs_diff_eq!(candidates[0].0, 50.0);
        assert_abs_diff_eq!(candidates[1].0, 49.9995, epsilon = 1e-12);
        assert_abs_diff_eq!(candidates[2].0, 49.9985, epsilon = 1e-12);
        assert_abs_diff_eq!(candidates[3].0, 49.997, epsilon = 1e-12);
    }

    #[test]
    fn test_fixed_schedule() {
        let candidates = StepSchedule::Fixed
            .candidates(Kilowatts::from(1.0), Kilowatts::from(0.25))
            .take(5)
            .collect_vec();
        assert_eq!(candidates, [1.0, 0.75, 0.5, 0.25, 0.0].map(Kilowatts::from));
    }

    #[test]
    fn test_accumulating_trade_off() {
        let options = SearchOptions::builder()
            .schedule(StepSchedule::Accumulating)
            .peak_demand(PeakDemand::Load)
            .build();
        let curve = prepare(&spiky_day(), options).value.trade_off().unwrap();
        assert_eq!(curve.point_2, *curve.bottom.last().unwrap());
        assert_eq!(curve.top.len(), curve.bottom.len());

        // The capacity after `i` iterations is `50 − 0.0005 × i × (i + 1) / 2`. The peak demand
        // stays at 119 × 50 / 60 below 50 kW, and the charge supply of 361 × (hp − 10) / 60 first
        // drops under it at `i = 307`:
        assert_eq!(curve.bottom.len(), 308);
        assert_abs_diff_eq!(
            curve.point_2.hp_capacity.0,
            50.0 - 0.00025 * 307.0 * 308.0,
            epsilon = 1e-9,
        );
        assert_abs_diff_eq!(curve.point_2.tes_capacity.0, 119.0 * 50.0 / 60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bottom_curve_not_converged() {
        let options = SearchOptions::builder().max_iterations(10).build();
        let sizer = prepare(&spiky_day(), options).value;
        assert!(matches!(
            sizer.bottom_curve(),
            Err(SizingError::NotConverged { curve: Curve::Bottom, n_iterations: 10 }),
        ));
    }

    #[test]
    fn test_top_curve_not_converged() {
        // Same walk, only the iteration limit differs:
        let day = spiky_day();
        let bottom = prepare(&day, SearchOptions::default()).value.bottom_curve().unwrap();
        let short = prepare(&day, SearchOptions::builder().max_iterations(10).build()).value;
        assert!(matches!(
            short.top_curve(&bottom),
            Err(SizingError::NotConverged { curve: Curve::Top, n_iterations: 10 }),
        ));
    }

    #[test]
    fn test_top_curve_rejects_foreign_bottom_curve() {
        let bottom = prepare(&spiky_day(), SearchOptions::default()).value.bottom_curve().unwrap();
        let other_day = day(|hour, _| if (12..14).contains(&hour) { 40.0 } else { 10.0 });
        let other = prepare(&other_day, SearchOptions::default()).value;
        assert!(matches!(other.top_curve(&bottom), Err(SizingError::MismatchedBottomCurve)));

        let coarse = SearchOptions::builder().step(Kilowatts::from(0.1)).build();
        let coarse = prepare(&spiky_day(), coarse).value;
        assert!(matches!(coarse.top_curve(&bottom), Err(SizingError::MismatchedBottomCurve)));
    }

    #[test]
    fn test_rejects_invalid_step() {
        let day = spiky_day();
        for step in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let error = Sizing::builder()
                .day(&day)
                .charge_period(Period::try_new(0, 6).unwrap())
                .discharge_period(Period::try_new(12, 14).unwrap())
                .options(SearchOptions::builder().step(Kilowatts::from(step)).build())
                .try_prepare()
                .err()
                .unwrap();
            assert!(matches!(error, SizingError::InvalidStep { .. }), "step {step}");
        }
    }

    #[test]
    fn test_rejects_flat_zero_day() {
        let day = day(|_, _| 0.0);
        let error = Sizing::builder()
            .day(&day)
            .charge_period(Period::try_new(0, 6).unwrap())
            .discharge_period(Period::try_new(12, 14).unwrap())
            .try_prepare()
            .err()
            .unwrap();
        assert!(matches!(error, SizingError::InvalidStep { .. }));
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let day = spiky_day();
        let error = Sizing::builder()
            .day(&day)
            .charge_period(Period::try_new(0, 6).unwrap())
            .discharge_period(Period::try_new(12, 14).unwrap())
            .options(SearchOptions::builder().max_iterations(0).build())
            .try_prepare()
            .err()
            .unwrap();
        assert!(matches!(error, SizingError::ZeroIterations));
    }

    #[test]
    fn test_trade_off() {
        let curve = prepare(&spiky_day(), SearchOptions::default()).value.trade_off().unwrap();
        assert_eq!(curve.point_1, CurvePoint::new(Kilowatts::from(50.0), KilowattHours::ZERO));
        assert_eq!(curve.point_2, *curve.bottom.last().unwrap());
        assert_eq!(curve.right.len(), 2);
        assert_abs_diff_eq!(curve.hp_size_max.0, 50.0);
    }

    #[test]
    fn test_empty_period() {
        let day = day(|_, _| 1.0).into_iter().filter(|(time, _)| time.hour() >= 12).collect_vec();
        let error = Sizing::builder()
            .day(&day)
            .charge_period(Period::try_new(0, 6).unwrap())
            .discharge_period(Period::try_new(12, 14).unwrap())
            .try_prepare()
            .err()
            .unwrap();
        assert!(matches!(
            error,
            SizingError::EmptyPeriod { period } if period == Period::try_new(0, 6).unwrap(),
        ));
    }

    #[test]
    fn test_overlapping_periods_warn() {
        let day = spiky_day();
        let sizer = Sizing::builder()
            .day(&day)
            .charge_period(Period::try_new(22, 13).unwrap())
            .discharge_period(Period::try_new(12, 14).unwrap())
            .try_prepare()
            .unwrap();
        assert_eq!(sizer.warnings, [Warning::OverlappingPeriods]);
    }
}
