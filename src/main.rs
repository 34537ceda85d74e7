use scm_manufacturer::io::market::{Market, MarketConfig};
use scm_manufacturer::io::reporting;
use scm_manufacturer::model::events::{InboundEvent, OutboundCommand};
use scm_manufacturer::{logging, Manufacturer, ManufacturerActor, SimulationConfig, SimulationError};
use std::env;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        error!(error = %e, "simulation failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), SimulationError> {
    // 1. SETUP CONFIGURATION
    // usage: scm-manufacturer [total_days] [output.csv]
    let mut args = env::args().skip(1);
    let total_days = args
        .next()
        .and_then(|d| d.parse().ok())
        .unwrap_or(SimulationConfig::default().total_days);
    let output_file = args.next().unwrap_or_else(|| "manufacturer_days.csv".to_string());

    let config = SimulationConfig {
        total_days,
        ..Default::default()
    };

    // 2. BUILD THE WORLD AND THE MANUFACTURER
    let mut market = Market::new(MarketConfig::default())?;
    let manufacturer = Manufacturer::new(config, market.start_info())?;
    let actor = ManufacturerActor::spawn(manufacturer, 16);

    // 3. RUN THE GAME, ONE DAY AT A TIME
    info!(total_days, "running simulation");
    for day in 0..total_days as i32 {
        let requests = market.customer_requests(day);
        let offers = actor
            .send(InboundEvent::CustomerRequests { day, requests })
            .await?;
        let offers: Vec<_> = offers
            .into_iter()
            .filter_map(|c| match c {
                OutboundCommand::CustomerOffer(o) => Some(o),
                _ => None,
            })
            .collect();

        let orders = market.customer_orders();
        let rfqs = actor
            .send(InboundEvent::CustomerOrders { day, orders })
            .await?;
        let rfqs: Vec<_> = rfqs
            .into_iter()
            .filter_map(|c| match c {
                OutboundCommand::SupplierRfq(r) => Some(r),
                _ => None,
            })
            .collect();

        let bundles = market.supplier_offers();
        let supplier_orders = actor
            .send(InboundEvent::SupplierOffers { day, bundles })
            .await?;
        let supplier_orders: Vec<_> = supplier_orders
            .into_iter()
            .filter_map(|c| match c {
                OutboundCommand::SupplierOrder(o) => Some(o),
                _ => None,
            })
            .collect();

        // messages sent today reach their receivers tomorrow
        market.receive_customer_offers(&offers);
        market.receive_supplier_rfqs(&rfqs);
        market.receive_supplier_orders(&supplier_orders);

        let status = market.daily_status(day);
        let schedule = actor.send(InboundEvent::DailyStatus(status)).await?;
        market.receive_factory_schedule(day, &schedule);
    }

    // 4. EXPORT RESULTS
    let manufacturer = actor.shutdown().await?;
    let history = manufacturer.finish();
    reporting::write_day_log(&output_file, &history)?;

    // 5. SUMMARY
    let summary = market.summary();
    info!(
        requests = summary.requests,
        orders = summary.orders,
        deliveries = summary.deliveries,
        revenue = summary.revenue,
        component_cost = summary.component_cost,
        output = %output_file,
        "simulation complete"
    );
    Ok(())
}
