//! Synchronous process simulation core.
//!
//! [`PlantSim`] owns every per-tick component — influent, cascade, PID,
//! DO plant, sensors, equipment, alarms, advisory, event log — and advances
//! them in dependency order under a single `tick()`. It is deliberately free
//! of async machinery so the whole process model can be driven and asserted
//! in plain unit tests; the actor in [`super`] owns scheduling.
//!
//! Mutators apply immediately and never run concurrently with a tick: the
//! owning actor serializes both over one command loop, and `snapshot()`
//! hands out owned clones only.

use chrono::{DateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::advisory;
use crate::alarms::AlarmEngine;
use crate::config::defaults;
use crate::config::PlantConfig;
use crate::control::PidController;
use crate::equipment::EquipmentRegistry;
use crate::events::EventLog;
use crate::sensors;
use crate::simulation::{aeration, cascade, influent};
use crate::types::{
    AiState, ControlMode, DoControl, EquipmentId, EventKind, PlantState, SensorBank,
    SensorChannel, SensorKind, StageData, Stages,
};

// ============================================================================
// Options
// ============================================================================

/// Tunables for a simulation instance. `Default` matches the built-in
/// constants; `from_config` pulls the operator's TOML values.
#[derive(Debug, Clone)]
pub struct SimOptions {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub setpoint_min: f64,
    pub setpoint_max: f64,
    pub initial_setpoint: f64,
    pub control_interval_ticks: u64,
    pub advisory_interval_ticks: u64,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            kp: defaults::PID_KP,
            ki: defaults::PID_KI,
            kd: defaults::PID_KD,
            setpoint_min: defaults::DO_SETPOINT_MIN,
            setpoint_max: defaults::DO_SETPOINT_MAX,
            initial_setpoint: defaults::DEFAULT_DO_SETPOINT,
            control_interval_ticks: defaults::CONTROL_INTERVAL_TICKS,
            advisory_interval_ticks: defaults::ADVISORY_INTERVAL_TICKS,
            seed: None,
        }
    }
}

impl SimOptions {
    pub fn from_config(cfg: &PlantConfig) -> Self {
        Self {
            kp: cfg.control.kp,
            ki: cfg.control.ki,
            kd: cfg.control.kd,
            setpoint_min: cfg.control.setpoint_min,
            setpoint_max: cfg.control.setpoint_max,
            initial_setpoint: cfg.control.default_setpoint,
            control_interval_ticks: cfg.simulation.control_interval_ticks,
            advisory_interval_ticks: cfg.simulation.advisory_interval_ticks,
            seed: cfg.simulation.seed,
        }
    }
}

// ============================================================================
// Plant Simulation
// ============================================================================

/// The complete process model behind one engine instance.
#[derive(Debug)]
pub struct PlantSim {
    options: SimOptions,
    rng: StdRng,
    running: bool,
    tick_count: u64,
    timestamp: DateTime<Utc>,
    last_tick: Option<DateTime<Utc>>,
    stages: Stages,
    sensors: SensorBank,
    equipment: EquipmentRegistry,
    pid: PidController,
    setpoint: f64,
    mode: ControlMode,
    pid_output: f64,
    ai: AiState,
    alarms: AlarmEngine,
    events: EventLog,
}

impl PlantSim {
    /// Build a simulation in its commissioning state.
    pub fn new(options: SimOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let now = Utc::now();
        let mut events = EventLog::new();
        events.push(EventKind::Info, "System initialized", now);

        let setpoint = options.initial_setpoint;
        let pid = PidController::new(options.kp, options.ki, options.kd);

        Self {
            rng,
            running: false,
            tick_count: 0,
            timestamp: now,
            last_tick: None,
            stages: Stages {
                raw: StageData::new(defaults::STAGE_VOLUME, 600.0, 400.0),
                primary: StageData::new(defaults::STAGE_VOLUME, 480.0, 240.0),
                secondary: StageData::new(defaults::STAGE_VOLUME, 72.0, 24.0),
                tertiary: StageData::new(defaults::STAGE_VOLUME, 3.6, 0.24),
                treated: StageData::new(defaults::STAGE_VOLUME, 2.0, 0.1),
            },
            sensors: SensorBank {
                dissolved_oxygen: SensorChannel::new(4.0),
                ph: SensorChannel::new(7.2),
                tss: SensorChannel::new(24.0),
                bod: SensorChannel::new(72.0),
                flow: SensorChannel::new(50.0),
                tds: SensorChannel::new(1200.0),
                turbidity: SensorChannel::new(45.0),
                pressure: SensorChannel::new(5.5),
            },
            equipment: EquipmentRegistry::new(),
            pid,
            setpoint,
            mode: ControlMode::Auto,
            pid_output: 50.0,
            ai: AiState {
                enabled: true,
                recommended_setpoint: setpoint,
                predicted_load: 1.0,
                energy_savings: 12.0,
            },
            alarms: AlarmEngine::new(),
            events,
            options,
        }
    }

    /// Seeded simulation with default tunables (tests, replay).
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SimOptions {
            seed: Some(seed),
            ..SimOptions::default()
        })
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the whole process by one tick. No-op while stopped.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if !self.running {
            return;
        }

        self.tick_count += 1;

        // Seconds since the previous cascade tick, normally 1. The first
        // tick and non-monotonic clocks fall back to the nominal period.
        let dt = self
            .last_tick
            .map(|prev| (now - prev).num_milliseconds() as f64 / 1000.0)
            .filter(|d| *d > 0.0)
            .unwrap_or(1.0);
        self.last_tick = Some(now);

        let hour = now.hour();

        // Fresh influent and instantaneous primary removal
        let influent_bod = influent::influent_bod(hour, &mut self.rng);
        let influent_tss = influent::influent_tss(influent_bod, &mut self.rng);
        let raw = StageData::new(defaults::STAGE_VOLUME, influent_bod, influent_tss);
        let primary = cascade::primary(&raw);

        // DO control: sub-sampled PID in auto, operator value in manual
        if self.mode == ControlMode::Auto
            && self.tick_count % self.options.control_interval_ticks == 0
        {
            let control_dt = self.options.control_interval_ticks as f64;
            let output = self.pid.calculate(
                self.setpoint,
                self.sensors.dissolved_oxygen.value,
                control_dt,
            );
            self.equipment.set_blower_speed(output);
        }
        let blower_speed = self.equipment.blower_speed();
        self.pid_output = blower_speed;

        // Biological and membrane stages decay from their previous values
        let prev_secondary = self.stages.secondary;
        let secondary = cascade::secondary(
            &prev_secondary,
            self.sensors.dissolved_oxygen.value,
            dt,
        );
        let tertiary = cascade::tertiary(&self.stages.tertiary, dt);
        let treated = tertiary;
        self.stages = Stages {
            raw,
            primary,
            secondary,
            tertiary,
            treated,
        };

        // DO mass balance against the secondary load entering this tick
        let new_do = aeration::step(
            self.sensors.dissolved_oxygen.value,
            prev_secondary.bod,
            blower_speed,
            dt,
        );

        // Synthetic physical values for the remaining channels
        let t = now.timestamp() as f64;
        let ph = 7.0 + (t / 60.0).sin() * 0.3;
        let flow = 50.0 + (t / 30.0).sin() * 10.0;
        let tds = 1200.0 + self.rng.gen::<f64>() * 100.0;
        let turbidity = secondary.tss * 1.8;
        let pressure = 5.0 + (blower_speed / 100.0) * 2.0;

        sensors::update_channel(
            &mut self.sensors.dissolved_oxygen,
            SensorKind::DissolvedOxygen,
            new_do,
            &mut self.rng,
        );
        sensors::update_channel(&mut self.sensors.ph, SensorKind::Ph, ph, &mut self.rng);
        sensors::update_channel(
            &mut self.sensors.tss,
            SensorKind::Tss,
            secondary.tss,
            &mut self.rng,
        );
        sensors::update_channel(
            &mut self.sensors.bod,
            SensorKind::Bod,
            secondary.bod,
            &mut self.rng,
        );
        sensors::update_channel(&mut self.sensors.flow, SensorKind::Flow, flow, &mut self.rng);
        sensors::update_channel(&mut self.sensors.tds, SensorKind::Tds, tds, &mut self.rng);
        sensors::update_channel(
            &mut self.sensors.turbidity,
            SensorKind::Turbidity,
            turbidity,
            &mut self.rng,
        );
        sensors::update_channel(
            &mut self.sensors.pressure,
            SensorKind::Pressure,
            pressure,
            &mut self.rng,
        );

        // Runtime hours for everything currently running
        self.equipment.accumulate_runtime(dt);

        // Alarm evaluation over the fresh sensor values
        let raised = self.alarms.evaluate(&mut self.sensors, now);
        for alarm in &raised {
            self.events.push(EventKind::Alarm, alarm.message.clone(), now);
        }

        // Periodic advisory refresh
        if self.ai.enabled && self.tick_count % self.options.advisory_interval_ticks == 0 {
            advisory::refresh(&mut self.ai, hour);
        }

        self.timestamp = now;
    }

    // ------------------------------------------------------------------
    // Operator Mutators
    // ------------------------------------------------------------------

    /// Begin ticking. A second call while running is a no-op.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.running {
            return;
        }
        self.running = true;
        self.events.push(EventKind::Info, "Simulation started", now);
        tracing::info!("Simulation started");
    }

    /// Stop ticking. Idempotent.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        if !self.running {
            return;
        }
        self.running = false;
        self.events.push(EventKind::Info, "Simulation stopped", now);
        tracing::info!("Simulation stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Set the DO setpoint, clamped to the operator band.
    pub fn set_do_setpoint(&mut self, setpoint: f64, now: DateTime<Utc>) {
        let clamped = setpoint.clamp(self.options.setpoint_min, self.options.setpoint_max);
        self.setpoint = clamped;
        self.events.push(
            EventKind::Control,
            format!("DO setpoint changed to {clamped:.1} mg/L"),
            now,
        );
    }

    /// Switch between auto and manual DO control.
    ///
    /// Manual-to-auto resets the PID so stale integral/derivative history
    /// cannot spike the blower command.
    pub fn set_do_mode(&mut self, mode: ControlMode, now: DateTime<Utc>) {
        if self.mode == ControlMode::Manual && mode == ControlMode::Auto {
            self.pid.reset();
        }
        self.mode = mode;
        self.events
            .push(EventKind::Control, format!("DO control mode: {mode}"), now);
    }

    /// Operator blower speed command. Effective while in manual mode; in
    /// auto the controller overwrites it on its next cycle.
    pub fn set_blower_speed(&mut self, speed: f64, now: DateTime<Utc>) {
        self.equipment.set_blower_speed(speed);
        self.events.push(
            EventKind::Control,
            format!("Blower speed set to {:.0}%", self.equipment.blower_speed()),
            now,
        );
    }

    pub fn toggle_equipment(&mut self, unit: EquipmentId, now: DateTime<Utc>) {
        let running = self.equipment.toggle(unit);
        self.events.push(
            EventKind::Control,
            format!(
                "{} {}",
                unit.display_name(),
                if running { "started" } else { "stopped" }
            ),
            now,
        );
    }

    pub fn set_dosing_pump_speed(&mut self, speed: f64) {
        self.equipment.set_dosing_pump_speed(speed);
    }

    pub fn set_bypass_valve_position(&mut self, position: f64) {
        self.equipment.set_bypass_valve_position(position);
    }

    /// Returns false for an unknown alarm id.
    pub fn acknowledge_alarm(&mut self, id: u64) -> bool {
        self.alarms.acknowledge(id)
    }

    pub fn toggle_ai(&mut self, now: DateTime<Utc>) {
        self.ai.enabled = !self.ai.enabled;
        self.events.push(
            EventKind::Info,
            format!(
                "AI optimizer {}",
                if self.ai.enabled { "enabled" } else { "disabled" }
            ),
            now,
        );
    }

    /// Copy the advisory's recommended setpoint into the DO setpoint.
    pub fn accept_ai_recommendation(&mut self, now: DateTime<Utc>) {
        let recommended = self.ai.recommended_setpoint;
        self.set_do_setpoint(recommended, now);
        self.events.push(
            EventKind::Control,
            format!("AI recommendation accepted: DO setpoint {recommended:.1} mg/L"),
            now,
        );
    }

    /// Append an entry to the plant event journal (scenario narration,
    /// lifecycle notices).
    pub fn log_event(&mut self, kind: EventKind, message: impl Into<String>, now: DateTime<Utc>) {
        self.events.push(kind, message, now);
    }

    // ------------------------------------------------------------------
    // Read Surface
    // ------------------------------------------------------------------

    /// Full, consistent snapshot of the current process state.
    pub fn snapshot(&self) -> PlantState {
        PlantState {
            timestamp: self.timestamp,
            running: self.running,
            tick_count: self.tick_count,
            stages: self.stages,
            sensors: self.sensors.clone(),
            equipment: *self.equipment.state(),
            control: DoControl {
                setpoint: self.setpoint,
                mode: self.mode,
                pid: self.pid.snapshot(),
                output: self.pid_output,
            },
            ai: self.ai,
            alarms: self.alarms.to_vec(),
            events: self.events.to_vec(),
        }
    }
}
