use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::adc::Adc;
use embassy_stm32::usart::{BufferedUart, Config as UartConfig, DataBits, Parity, StopBits};
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use sensor_core::delivery::DeliveryCoordinator;
use sensor_core::wire::{LinkCredentials, PushCredentials};

use crate::config;
use crate::hw::light::LightSensorAdc;
use crate::net::modem::AtModem;
use crate::notify::NotifyQueue;
use crate::power::PowerSaver;
use crate::sensing::SamplePipeline;
use crate::status::{SignalStatus, StatusSignal};

mod delivery_task;
mod sample_task;
mod status_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

const MODEM_UART_BAUD: u32 = 115_200;
const MODEM_UART_BUFFER_SIZE: usize = 512;

static mut MODEM_TX_BUFFER: [u8; MODEM_UART_BUFFER_SIZE] = [0; MODEM_UART_BUFFER_SIZE];
static mut MODEM_RX_BUFFER: [u8; MODEM_UART_BUFFER_SIZE] = [0; MODEM_UART_BUFFER_SIZE];

pub(super) static NOTIFY_QUEUE: NotifyQueue = Channel::new();
pub(super) static STATUS_SIGNAL: StatusSignal = Signal::new();
pub(super) static POWER: PowerSaver = PowerSaver::new();

embassy_stm32::bind_interrupts!(struct UartIrqs {
    USART1 => embassy_stm32::usart::BufferedInterruptHandler<hal::peripherals::USART1>;
});

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let hal_config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA9,
        PA10,
        ADC1,
        USART1,
        ..
    } = hal::init(hal_config);

    let sensor = LightSensorAdc::new(Adc::new(ADC1), PA0);
    let pipeline = SamplePipeline::new().expect("threshold configuration");

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = MODEM_UART_BAUD;
    uart_config.data_bits = DataBits::DataBits8;
    uart_config.stop_bits = StopBits::STOP1;
    uart_config.parity = Parity::ParityNone;

    let uart = unsafe {
        BufferedUart::new(
            USART1,
            PA10,
            PA9,
            &mut MODEM_TX_BUFFER,
            &mut MODEM_RX_BUFFER,
            UartIrqs,
            uart_config,
        )
        .expect("failed to initialize modem UART")
    };

    let link = LinkCredentials {
        ssid: config::WIFI_SSID,
        passphrase: config::WIFI_PASSPHRASE,
    };
    let push = PushCredentials {
        token: config::PUSH_TOKEN,
        user: config::PUSH_USER,
    };
    let status = SignalStatus::new(&STATUS_SIGNAL);
    let coordinator = DeliveryCoordinator::new(AtModem::new(uart), &POWER, status, link, push);

    spawner
        .spawn(sample_task::run(
            sensor,
            pipeline,
            NOTIFY_QUEUE.sender(),
            status,
            &POWER,
        ))
        .expect("failed to spawn sample task");

    spawner
        .spawn(delivery_task::run(coordinator, NOTIFY_QUEUE.receiver()))
        .expect("failed to spawn delivery task");

    spawner
        .spawn(status_task::run(&STATUS_SIGNAL, &POWER))
        .expect("failed to spawn status task");

    core::future::pending::<()>().await;
}
