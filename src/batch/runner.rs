//! # 批量执行器
//!
//! 在限定线程数的 rayon 线程池中并行处理一批输入，结果顺序与输入一致。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代
//! - 进度条显示
//! - 成功 / 失败分拣与汇总
//!
//! ## 依赖关系
//! - 被 `commands/common.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{QlossError, Result};
use crate::utils::progress;

use rayon::prelude::*;

/// 批量处理结果：成功项保持输入顺序，失败项记录名称与原因
#[derive(Debug)]
pub struct BatchResult<T> {
    pub items: Vec<T>,
    pub failures: Vec<(String, String)>,
}

impl<T> BatchResult<T> {
    pub fn total(&self) -> usize {
        self.items.len() + self.failures.len()
    }
}

/// 批量执行器
pub struct BatchRunner {
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器；`jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    /// 并行映射，返回与输入等长、同序的结果
    pub fn map<I, T, F>(&self, inputs: &[I], message: &str, processor: F) -> Result<Vec<Result<T>>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> Result<T> + Sync + Send,
    {
        let pb = progress::create_progress_bar(inputs.len() as u64, message);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| QlossError::InvalidArgument(format!("Cannot start thread pool: {}", e)))?;

        let results = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| {
                    let result = processor(input);
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();
        Ok(results)
    }

    /// 并行映射并分拣成功 / 失败；`name` 用于标识失败项
    pub fn run<I, T, F, N>(
        &self,
        inputs: &[I],
        message: &str,
        name: N,
        processor: F,
    ) -> Result<BatchResult<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> Result<T> + Sync + Send,
        N: Fn(&I) -> String,
    {
        let results = self.map(inputs, message, processor)?;

        let mut batch = BatchResult {
            items: Vec::with_capacity(results.len()),
            failures: Vec::new(),
        };
        for (input, result) in inputs.iter().zip(results) {
            match result {
                Ok(item) => batch.items.push(item),
                Err(e) => batch.failures.push((name(input), e.to_string())),
            }
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_preserves_order() {
        let runner = BatchRunner::new(4);
        let inputs: Vec<u32> = (0..100).collect();
        let results = runner.map(&inputs, "squaring", |&x| Ok(x * x)).unwrap();
        let values: Vec<u32> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, inputs.iter().map(|x| x * x).collect::<Vec<_>>());
    }

    #[test]
    fn test_run_splits_failures() {
        let runner = BatchRunner::new(2);
        let inputs = vec![1, 2, 3, 4];
        let batch = runner
            .run(
                &inputs,
                "checking",
                |x| format!("item {}", x),
                |&x| {
                    if x % 2 == 0 {
                        Ok(x)
                    } else {
                        Err(QlossError::InvalidArgument(format!("odd {}", x)))
                    }
                },
            )
            .unwrap();
        assert_eq!(batch.items, vec![2, 4]);
        assert_eq!(batch.failures.len(), 2);
        assert_eq!(batch.failures[0].0, "item 1");
        assert_eq!(batch.total(), 4);
    }
}
