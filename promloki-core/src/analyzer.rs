// Predefined analyses: an app instance's query templates rendered with the
// caller's labels and executed as one batch.

use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::client::MetricsBackend;
use crate::config::{GlobalConfig, QueryTemplate};
use crate::models::{AnalyzeRequest, AnalyzeResponse, MetricResult, QueryParams};
use crate::template::render_query;

/// Time window shared by every query of one analysis.
#[derive(Debug, Clone, Copy)]
pub struct RangeWindow<'a> {
    pub start: i64,
    pub end: i64,
    pub step: &'a str,
}

pub struct AnalyzeService {
    config: Arc<GlobalConfig>,
    backend: Arc<dyn MetricsBackend>,
}

impl AnalyzeService {
    pub fn new(config: Arc<GlobalConfig>, backend: Arc<dyn MetricsBackend>) -> Self {
        Self { config, backend }
    }

    pub async fn execute_query(
        &self,
        template: &QueryTemplate,
        labels: &BTreeMap<String, String>,
        interval: &str,
        window: Option<RangeWindow<'_>>,
    ) -> Result<MetricResult> {
        let query = render_query(&template.template, labels, interval);
        let params = match window {
            Some(w) => {
                debug!(
                    "Range analysis query metric={} step={} start={} end={}",
                    template.metric, w.step, w.start, w.end
                );
                QueryParams::range(query, w.start, w.end, w.step)
            }
            None => {
                debug!("Instant analysis query metric={}", template.metric);
                QueryParams::instant(query)
            }
        };

        let data = self
            .backend
            .execute(&params)
            .await
            .with_context(|| format!("query for metric '{}' failed", template.metric))?;

        Ok(MetricResult {
            metric: template.metric.clone(),
            description: template.description.clone(),
            data,
        })
    }

    pub async fn get_report(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse> {
        let is_range = request.is_range();
        info!("Generating analysis report name={} range={}", request.name, is_range);

        let instance = self.config.find_instance(&request.name).ok_or_else(|| {
            error!("Analysis type not found name={}", request.name);
            anyhow!("AppInstance not found: {}", request.name)
        })?;

        let interval = self.config.effective_interval(request.interval.as_deref());
        let window = match (request.start, request.end, request.step.as_deref()) {
            (Some(start), Some(end), Some(step)) => Some(RangeWindow { start, end, step }),
            _ => None,
        };

        let mut result_data = Vec::with_capacity(instance.query_templates.len());
        for template in &instance.query_templates {
            result_data.push(
                self.execute_query(template, &request.labels, &interval, window)
                    .await?,
            );
        }

        info!("Analysis finished name={} metrics={}", instance.name, result_data.len());
        Ok(AnalyzeResponse {
            name: instance.name.clone(),
            description: instance.description.clone(),
            range_query: is_range,
            start: request.start,
            end: request.end,
            step: request.step.clone(),
            interval: Some(interval),
            result_data,
        })
    }
}
