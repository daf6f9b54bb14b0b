quantity!(
    /// Currency per kilowatt-hour.
    KilowattHourPrice, via: f64, suffix: "$/kWh", precision: 3
);
zero!(KilowattHourPrice);

quantity!(Cost, via: f64, suffix: "$", precision: 2);

impl KilowattHourPrice {
    pub const ONE_CENT: Self = Self(0.01);
}
