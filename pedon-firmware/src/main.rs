//! Pedon - Field Sensor Node Firmware
//!
//! Main firmware binary for RP2040-based field nodes: polls SDI-12 soil
//! sensors on an aligned schedule and relays the readings through a
//! Swarm-class satellite modem ("tile").
//!
//! Named after the pedon, the smallest body of soil large enough to show
//! the character of its horizons - the patch of ground every one of
//! these nodes sits on and reports about.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pedon_core::NodeConfig;
use pedon_drivers::tile::TileLink;
use pedon_hal_rp2040::clock::UptimeClock;
use pedon_hal_rp2040::flash::FlashStorage;
use pedon_hal_rp2040::uart::{uart_config, Sdi12Serial, TileSerial, UartConfig};

use crate::config::ConfigStore;
use crate::tasks::battery::BatteryAdc;
use crate::tasks::sdi12::RailPin;

mod channels;
mod config;
mod diag;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static TILE_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static TILE_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static SDI12_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static SDI12_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Static cell for configuration (must live forever for task references)
static NODE_CONFIG: StaticCell<NodeConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("pedon firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("peripherals initialized");

    // Load node state from flash (or provision defaults)
    let flash = FlashStorage::new(p.FLASH, p.DMA_CH0);
    let mut store = ConfigStore::new(flash);
    let config = store.load_or_default().await;
    let report_index = store.load_report_index().await;
    let config: &'static NodeConfig = NODE_CONFIG.init(config);
    info!("configuration loaded, report index {}", report_index);

    // Tile modem on UART0 (115200 8N1)
    let tile_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config(UartConfig::tile()));
    let tile_uart = tile_uart.into_buffered(
        Irqs,
        TILE_TX_BUF.init([0u8; 256]),
        TILE_RX_BUF.init([0u8; 256]),
    );
    let (tile_tx, tile_rx) = tile_uart.split();

    // SDI-12 bus on UART1 (1200 7E1), direction gate on GPIO21
    let sdi12_uart =
        Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, uart_config(UartConfig::sdi12()));
    let sdi12_uart = sdi12_uart.into_buffered(
        Irqs,
        SDI12_TX_BUF.init([0u8; 64]),
        SDI12_RX_BUF.init([0u8; 256]),
    );
    let (sdi12_tx, sdi12_rx) = sdi12_uart.split();
    let sdi12_dir = Output::new(p.PIN_21, Level::Low);
    let sdi12_serial = Sdi12Serial::new(sdi12_tx, sdi12_rx, sdi12_dir);

    info!("uarts initialized");

    // Sensor power rail on GPIO22, off until a measurement runs
    let rail = RailPin(Output::new(p.PIN_22, Level::Low));

    // Battery sense divider on GPIO26 / ADC0
    let battery_adc = Adc::new_blocking(p.ADC, adc::Config::default());
    let battery_channel = adc::Channel::new_pin(p.PIN_26, Pull::None);
    let battery_adc = BatteryAdc::new(battery_adc, battery_channel);

    // Bring the modem up before anything else runs; begin() blocks on
    // purpose and nothing is spawned yet
    let mut link = TileLink::new(
        TileSerial::new(tile_tx, tile_rx),
        diag::RttSink,
        config.message_ttl_s,
        config.dev_mode,
    );
    info!("tile modem bring-up...");
    link.begin(&UptimeClock);
    info!("tile modem ready");

    // Spawn tasks
    spawner.spawn(tasks::tile_task(link)).unwrap();
    spawner.spawn(tasks::sdi12_task(sdi12_serial, rail)).unwrap();
    spawner.spawn(tasks::battery_task(battery_adc)).unwrap();
    spawner
        .spawn(tasks::controller_task(store, config, report_index))
        .unwrap();

    info!("all tasks spawned, node running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("main loop heartbeat");
    }
}
