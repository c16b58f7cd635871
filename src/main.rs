use std::env;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use log::{error, info, warn};

use vitalshub::config::{AppConfig, DEFAULT_CONFIG_PATH};
use vitalshub::mqtt::{self, BrokerControl};
use vitalshub::{logger, Session, TelemetryIngestor};

fn main() {
    let config_path = env::var("VITALSHUB_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", config_path, e);
            process::exit(1);
        }
    };

    logger::init_logger(&config.logging.level);
    info!("Application starting");

    let (control, pump) = match mqtt::connect(&config.mqtt) {
        Ok(pair) => pair,
        Err(e) => {
            error!("Failed to create MQTT client: {}", e);
            process::exit(1);
        }
    };

    let (event_sender, event_receiver) = bounded(config.session.event_channel_capacity);
    let shutdown_signal = Arc::new(AtomicBool::new(false));

    let mqtt_shutdown = Arc::clone(&shutdown_signal);
    let mqtt_handle = thread::spawn(move || pump.run(event_sender, mqtt_shutdown));

    if let Some(secs) = config.session.run_for_secs {
        let timer_shutdown = Arc::clone(&shutdown_signal);
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            info!("Session time limit of {}s reached", secs);
            timer_shutdown.store(true, Ordering::Relaxed);
        });
    }

    let ingestor = TelemetryIngestor::from_config(&config);
    let mut session = Session::new(control.clone(), ingestor, config.session.summary_interval_secs);
    session.run(&event_receiver, &shutdown_signal);

    // 会话结束后，发送关闭信号给 MQTT 线程
    shutdown_signal.store(true, Ordering::Relaxed);
    if let Err(e) = control.disconnect() {
        warn!("MQTT disconnect failed: {}", e);
    }
    drop(event_receiver);

    match mqtt_handle.join() {
        Ok(()) => info!("MQTT thread shut down gracefully"),
        Err(e) => error!("MQTT thread panicked: {:?}", e),
    }
}
