/// Test fixtures: representative JSON payloads from the Environment Agency
/// flood-monitoring API.
///
/// They reflect the envelope returned by:
///   https://environment.data.gov.uk/flood-monitoring/id/measures/{id}
///
/// Measure response shape:
///   response.items                 — object for /id/measures/{id}, array for
///                                    list queries
///     .label                       — station / measure label
///     .latestReading               — object, or a bare URI when no reading
///       .dateTime                  — ISO 8601, UTC ("Z")
///       .value                     — number (occasionally a numeric string)

/// Single measure object, as served for the Reading flow gauge.
#[cfg(test)]
pub(crate) fn fixture_measure_object_json() -> &'static str {
    r#"{
      "@context": "http://environment.data.gov.uk/flood-monitoring/meta/context.jsonld",
      "meta": { "publisher": "Environment Agency", "version": "0.9" },
      "items": {
        "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/2200TH-flow--Mean-15_min-m3_s",
        "label": "Reading",
        "latestReading": {
          "@id": "http://environment.data.gov.uk/flood-monitoring/data/readings/2200TH-flow--Mean-15_min-m3_s/2024-01-01T10-00-00Z",
          "date": "2024-01-01",
          "dateTime": "2024-01-01T10:00:00Z",
          "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/2200TH-flow--Mean-15_min-m3_s",
          "value": 42.5
        },
        "parameter": "flow",
        "parameterName": "Flow",
        "period": 900,
        "qualifier": "Mean",
        "station": "http://environment.data.gov.uk/flood-monitoring/id/stations/2200TH",
        "stationReference": "2200TH",
        "unit": "http://qudt.org/1.1/vocab/unit#CubicMeterPerSecond",
        "unitName": "m3/s",
        "valueType": "mean"
      }
    }"#
}

/// List-query shape: `items` is an array. Only the first entry is the
/// measure; the second belongs to another station.
#[cfg(test)]
pub(crate) fn fixture_measure_array_json() -> &'static str {
    r#"{
      "items": [
        {
          "label": "Reading",
          "latestReading": { "dateTime": "2024-02-14T07:15:00Z", "value": 88 }
        },
        {
          "label": "Caversham Lock",
          "latestReading": { "dateTime": "2024-02-14T07:15:00Z", "value": 120 }
        }
      ]
    }"#
}

/// Array whose first entry has no reading while a later, unrelated entry does.
#[cfg(test)]
pub(crate) fn fixture_array_first_item_without_reading_json() -> &'static str {
    r#"{
      "items": [
        { "label": "Other Station" },
        {
          "label": "Elsewhere",
          "latestReading": { "dateTime": "2024-01-01T10:00:00Z", "value": 120 }
        }
      ]
    }"#
}

/// Value sent as a string, as some EA mirrors do.
#[cfg(test)]
pub(crate) fn fixture_string_value_json() -> &'static str {
    r#"{
      "items": {
        "label": "Reading",
        "latestReading": { "dateTime": "2024-01-01T10:00:00Z", "value": "42.5" }
      }
    }"#
}

/// Measure object without any label.
#[cfg(test)]
pub(crate) fn fixture_unlabelled_json() -> &'static str {
    r#"{
      "items": {
        "latestReading": { "dateTime": "2024-03-10T23:45:00Z", "value": 12.25 }
      }
    }"#
}

/// Measure object whose `latestReading` is absent.
#[cfg(test)]
pub(crate) fn fixture_missing_latest_reading_json() -> &'static str {
    r#"{
      "items": {
        "label": "Reading",
        "parameter": "flow"
      }
    }"#
}
